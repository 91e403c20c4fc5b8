use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::validate_player_name;

/// Payload used by a participant to claim a seat in the lobby.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinRequest {
    /// Roster name of the joining participant.
    #[validate(custom(function = validate_player_name))]
    pub name: String,
}

/// Payload used by the admin to remove a participant from the lobby.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LeaveRequest {
    /// Name of the seated participant to remove.
    #[validate(custom(function = validate_player_name))]
    pub name: String,
}

/// Increment/decrement one participant's recorded value for one round.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AdjustLevelRequest {
    /// Seated participant name.
    #[validate(custom(function = validate_player_name))]
    pub name: String,
    /// Round index, 0-based, below the session's known round count.
    pub round: usize,
    /// Signed delta to add; negative values record a level loss.
    pub delta: i32,
}

/// Overwrite one participant's recorded value for one round.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SetLevelRequest {
    /// Seated participant name.
    #[validate(custom(function = validate_player_name))]
    pub name: String,
    /// Round index, 0-based, below the session's known round count.
    pub round: usize,
    /// Absolute value to store for the round.
    pub value: i32,
}

/// Change the target score of the active session.
///
/// Carries the passphrase even though the route is already admin-gated: target
/// changes mid-game are deliberately double-confirmed.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetTargetRequest {
    /// Shared admin passphrase, re-confirmed for this action.
    pub passphrase: String,
    /// New target score; must be one of the configured options.
    pub value: i32,
}

/// Terminate the active session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EndSessionRequest {
    /// Names to archive as winners. Empty ends the game without saving.
    #[serde(default)]
    pub winners: Vec<String>,
}

/// Result of a level mutation, echoing the stored value and derived state.
#[derive(Debug, Serialize, ToSchema)]
pub struct LevelUpdateResponse {
    /// Participant whose round was mutated.
    pub name: String,
    /// Round index that was mutated.
    pub round: usize,
    /// Value now stored for that round.
    pub value: i32,
    /// Participant's derived total after the mutation.
    pub total: i32,
    /// Names currently meeting the win condition.
    pub winners: Vec<String>,
}

/// Result of extending the session by one round.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddRoundResponse {
    /// Round count now known to the session.
    pub rounds: usize,
}

/// Generic acknowledgement for lifecycle actions.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Short human-readable outcome.
    pub status: String,
}

impl ActionResponse {
    /// Acknowledge a completed action.
    pub fn done(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}
