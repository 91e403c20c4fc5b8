use serde::Serialize;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{HistoryEntryEntity, PlayerDetailEntity},
    dto::format_system_time,
};

/// Round-by-round breakdown of one participant in a concluded game.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct PlayerDetail {
    /// Participant display name.
    pub name: String,
    /// Level delta per round.
    pub levels: Vec<i32>,
}

impl From<PlayerDetailEntity> for PlayerDetail {
    fn from(value: PlayerDetailEntity) -> Self {
        Self {
            name: value.name,
            levels: value.levels,
        }
    }
}

/// One concluded session as exposed to clients.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct HistoryEntry {
    /// Ledger identifier, usable with the admin delete endpoint.
    pub id: Uuid,
    /// RFC3339 archival instant; sortable.
    pub recorded_at: String,
    /// Display-only capture of the archival time.
    pub date: String,
    /// Names that played, in join order.
    pub participants: Vec<String>,
    /// Winners at archival time; repeated names on legacy aggregates.
    pub winners: Vec<String>,
    /// Per-participant detail when the entry carries it.
    pub details: Option<Vec<PlayerDetail>>,
    /// Target score in effect when the game concluded.
    pub final_target: Option<i32>,
    /// True for compressed pre-digitization aggregates.
    pub legacy: bool,
}

impl From<HistoryEntryEntity> for HistoryEntry {
    fn from(value: HistoryEntryEntity) -> Self {
        let legacy = value.is_legacy();
        Self {
            id: value.id,
            recorded_at: format_system_time(value.recorded_at),
            date: value.date,
            participants: value.participants,
            winners: value.winners,
            details: value
                .details
                .map(|details| details.into_iter().map(Into::into).collect()),
            final_target: value.final_target,
            legacy,
        }
    }
}
