use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::history::HistoryEntry, error::AppError, services::history_service, state::SharedState,
};

/// Public read access to the history ledger.
pub fn router() -> Router<SharedState> {
    Router::new().route("/history", get(list_history))
}

/// List concluded sessions, oldest first.
#[utoipa::path(
    get,
    path = "/history",
    tag = "history",
    responses((status = 200, description = "Ledger entries", body = [HistoryEntry]))
)]
pub async fn list_history(
    State(state): State<SharedState>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let entries = history_service::list(&state).await?;
    Ok(Json(entries))
}
