use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::history::HistoryEntry;

/// Dispatched payload carried across SSE channels.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Serialized data field.
    pub data: String,
}

impl ServerEvent {
    /// Build a raw event with a preformatted data field.
    pub fn new<E>(event: E, data: String) -> Self
    where
        E: Into<Option<String>>,
    {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

/// Broadcast whenever the durable roster changes.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterChangedEvent {
    /// The full roster after the change, in insertion order.
    pub names: Vec<String>,
}

/// Broadcast when a concluded session has been appended to the ledger.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryArchivedEvent {
    /// The freshly archived record.
    pub entry: HistoryEntry,
}

/// Broadcast when an admin deletes a ledger record.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryDeletedEvent {
    /// Identifier of the removed record.
    pub id: Uuid,
}

/// Broadcast while at least one participant meets the win condition.
///
/// Play may continue; the set is recomputed and re-broadcast on every
/// subsequent mutation until the admin archives or the condition clears.
#[derive(Debug, Serialize, ToSchema)]
pub struct WinPendingEvent {
    /// Names at or above the target, in join order.
    pub winners: Vec<String>,
}

/// Broadcast when the backend enters or leaves degraded mode.
#[derive(Debug, Serialize, ToSchema)]
pub struct SystemStatus {
    /// True while no storage backend is reachable.
    pub degraded: bool,
}
