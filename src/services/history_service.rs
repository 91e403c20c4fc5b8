//! Read and admin-delete access to the history ledger.

use uuid::Uuid;

use crate::{
    dto::history::HistoryEntry, error::ServiceError, services::sse_events, state::SharedState,
};

/// All ledger entries, oldest first.
pub async fn list(state: &SharedState) -> Result<Vec<HistoryEntry>, ServiceError> {
    let store = state.require_ledger_store().await?;
    let entries = store.list_history().await?;
    Ok(entries.into_iter().map(Into::into).collect())
}

/// Delete one ledger entry. Entries are otherwise immutable.
pub async fn delete(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_ledger_store().await?;
    let deleted = store.delete_history(id).await?;
    if !deleted {
        return Err(ServiceError::NotFound(format!(
            "history entry `{id}` not found"
        )));
    }

    sse_events::broadcast_history_deleted(state, id);
    Ok(())
}
