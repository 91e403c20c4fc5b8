use serde::Serialize;
use utoipa::ToSchema;

use crate::services::stats_service::{LeaderboardSlot, PlayerStanding};

/// Per-participant aggregate line of the standings table.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct PlayerStandingDto {
    /// Roster name.
    pub name: String,
    /// Games played, legacy aggregates included.
    pub matches: u32,
    /// Games won, counting repeated legacy winner occurrences.
    pub wins: u32,
    /// Rounded win percentage; 0 without matches.
    pub rate: u32,
}

impl From<PlayerStanding> for PlayerStandingDto {
    fn from(value: PlayerStanding) -> Self {
        Self {
            name: value.name,
            matches: value.matches,
            wins: value.wins,
            rate: value.rate,
        }
    }
}

/// Names tied at the maximum of one leaderboard metric.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct LeaderboardSlotDto {
    /// All names sharing the maximum; empty when nobody has played.
    pub names: Vec<String>,
    /// The shared metric value.
    pub value: u32,
}

impl From<Option<LeaderboardSlot>> for LeaderboardSlotDto {
    fn from(value: Option<LeaderboardSlot>) -> Self {
        match value {
            Some(slot) => Self {
                names: slot.names,
                value: slot.value,
            },
            None => Self {
                names: Vec::new(),
                value: 0,
            },
        }
    }
}

/// The three leaderboard extractions rendered on the main screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct PodiumDto {
    /// Most games played.
    pub matches: LeaderboardSlotDto,
    /// Most games won.
    pub wins: LeaderboardSlotDto,
    /// Best win rate.
    pub rate: LeaderboardSlotDto,
}
