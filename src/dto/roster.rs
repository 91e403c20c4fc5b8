use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::validate_player_name;

/// Payload used to add one name to the durable roster.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddRosterEntryRequest {
    /// Display name to append; must not duplicate an existing entry.
    #[validate(custom(function = validate_player_name))]
    pub name: String,
}

/// The durable roster in insertion order.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterResponse {
    /// Eligible participant names.
    pub names: Vec<String>,
}
