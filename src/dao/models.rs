use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Per-participant round breakdown embedded in a concluded game record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerDetailEntity {
    /// Participant display name.
    pub name: String,
    /// Level delta recorded for each round, in round order.
    pub levels: Vec<i32>,
}

/// Precomputed aggregate carried by pre-digitization records.
///
/// These entries compress many historical games into one document: matches are
/// summed per name, and a participant who won several times appears that many
/// times in the parent entry's `winners` list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LegacyAggregateEntity {
    /// Total matches played per participant name.
    pub matches_count: IndexMap<String, u32>,
}

/// One immutable record of a concluded session (or a legacy aggregate).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntryEntity {
    /// Primary key assigned at archival time.
    pub id: Uuid,
    /// Archival instant, used for chronological ordering.
    pub recorded_at: SystemTime,
    /// Human-readable capture of the archival time. Not sortable; display only.
    pub date: String,
    /// Names that played, in join order.
    pub participants: Vec<String>,
    /// Names meeting the win condition at archival time. Legacy aggregates may
    /// repeat a name to encode multiple compressed wins.
    pub winners: Vec<String>,
    /// Full round-by-round breakdown, absent on legacy aggregates.
    pub details: Option<Vec<PlayerDetailEntity>>,
    /// Target score in effect when this game concluded.
    pub final_target: Option<i32>,
    /// Present when this record is a pre-digitization aggregate.
    pub legacy: Option<LegacyAggregateEntity>,
}

impl HistoryEntryEntity {
    /// Whether this record is a compressed pre-digitization aggregate.
    pub fn is_legacy(&self) -> bool {
        self.legacy.is_some()
    }
}
