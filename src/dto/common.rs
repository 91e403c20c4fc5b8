use serde::Serialize;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

use crate::state::{
    session::{PlayerProgress, Session},
    state_machine::SessionPhase,
};

/// Publicly visible session phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleSessionPhase {
    /// No session in progress.
    Idle,
    /// Lobby open, participants joining.
    Forming,
    /// Game underway.
    Active,
}

impl From<SessionPhase> for VisibleSessionPhase {
    fn from(value: SessionPhase) -> Self {
        match value {
            SessionPhase::Idle => VisibleSessionPhase::Idle,
            SessionPhase::Forming => VisibleSessionPhase::Forming,
            SessionPhase::Active => VisibleSessionPhase::Active,
        }
    }
}

/// Projection of one participant's progress, including the derived total.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct PlayerSnapshot {
    /// Participant display name.
    pub name: String,
    /// Per-round level deltas.
    pub levels: Vec<i32>,
    /// Derived level: baseline 1 plus all deltas. Never stored.
    pub total: i32,
}

impl From<&PlayerProgress> for PlayerSnapshot {
    fn from(progress: &PlayerProgress) -> Self {
        Self {
            name: progress.name.clone(),
            levels: progress.levels.clone(),
            total: progress.total(),
        }
    }
}

/// Shared snapshot describing the session as every observer should render it.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct SessionSnapshot {
    /// Current lifecycle phase.
    pub phase: VisibleSessionPhase,
    /// True when the backend operates without a storage connection.
    pub degraded: bool,
    /// Target score in effect; absent while idle.
    pub target_score: Option<i32>,
    /// Number of rounds known so far; absent while idle.
    pub rounds: Option<usize>,
    /// Participants in join order. Empty while idle.
    pub players: Vec<PlayerSnapshot>,
    /// Names currently meeting the win condition, in join order.
    pub winners: Vec<String>,
}

impl SessionSnapshot {
    /// Build a snapshot from the machine phase and the (possibly absent) session.
    pub fn build(phase: SessionPhase, session: Option<&Session>, degraded: bool) -> Self {
        match session {
            Some(session) => Self {
                phase: phase.into(),
                degraded,
                target_score: Some(session.target_score),
                rounds: Some(session.rounds),
                players: session.players.values().map(Into::into).collect(),
                winners: session.winners(),
            },
            None => Self {
                phase: phase.into(),
                degraded,
                target_score: None,
                rounds: None,
                players: Vec::new(),
                winners: Vec::new(),
            },
        }
    }
}
