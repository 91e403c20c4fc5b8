use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        history::HistoryEntry,
        sse::{
            HistoryArchivedEvent, HistoryDeletedEvent, RosterChangedEvent, ServerEvent,
            SystemStatus, WinPendingEvent,
        },
    },
    services::session_service,
    state::SharedState,
};

const EVENT_PHASE_CHANGED: &str = "phase_changed";
const EVENT_SESSION: &str = "session";
const EVENT_WIN_PENDING: &str = "win.pending";
const EVENT_ROSTER_CHANGED: &str = "roster.changed";
const EVENT_HISTORY_ARCHIVED: &str = "history.archived";
const EVENT_HISTORY_DELETED: &str = "history.deleted";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast the session snapshot after a lifecycle phase change.
pub async fn broadcast_phase_changed(state: &SharedState) {
    let snapshot = session_service::capture_snapshot(state).await;
    send_public_event(state, EVENT_PHASE_CHANGED, &snapshot);
}

/// Broadcast the session snapshot after an in-phase mutation (join, level
/// change, round added, target changed), chasing it with a pending-win event
/// whenever the derived win condition is non-empty.
pub async fn broadcast_session_changed(state: &SharedState) {
    let snapshot = session_service::capture_snapshot(state).await;
    let winners = snapshot.winners.clone();
    send_public_event(state, EVENT_SESSION, &snapshot);

    if !winners.is_empty() {
        broadcast_win_pending(state, winners);
    }
}

/// Broadcast the set of participants currently meeting the win condition.
pub fn broadcast_win_pending(state: &SharedState, winners: Vec<String>) {
    let payload = WinPendingEvent { winners };
    send_public_event(state, EVENT_WIN_PENDING, &payload);
}

/// Broadcast the full roster after an add, remove, or seed.
pub fn broadcast_roster_changed(state: &SharedState, names: &[String]) {
    let payload = RosterChangedEvent {
        names: names.to_vec(),
    };
    send_public_event(state, EVENT_ROSTER_CHANGED, &payload);
}

/// Broadcast a freshly archived ledger record.
pub fn broadcast_history_archived(state: &SharedState, entry: HistoryEntry) {
    let payload = HistoryArchivedEvent { entry };
    send_public_event(state, EVENT_HISTORY_ARCHIVED, &payload);
}

/// Broadcast the removal of a ledger record.
pub fn broadcast_history_deleted(state: &SharedState, id: uuid::Uuid) {
    let payload = HistoryDeletedEvent { id };
    send_public_event(state, EVENT_HISTORY_DELETED, &payload);
}

/// Broadcast a degraded-mode toggle.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    let payload = SystemStatus { degraded };
    send_public_event(state, EVENT_SYSTEM_STATUS, &payload);
}

fn send_public_event<T: Serialize>(state: &SharedState, event: &str, payload: &T) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(server_event) => state.public_sse().broadcast(server_event),
        Err(err) => warn!(event, error = %err, "failed to serialise SSE payload"),
    }
}
