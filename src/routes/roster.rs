use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::roster::RosterResponse, error::AppError, services::roster_service, state::SharedState,
};

/// Public read access to the durable roster.
pub fn router() -> Router<SharedState> {
    Router::new().route("/roster", get(get_roster))
}

/// List the eligible participant names in insertion order.
#[utoipa::path(
    get,
    path = "/roster",
    tag = "roster",
    responses((status = 200, description = "Roster names", body = RosterResponse))
)]
pub async fn get_roster(
    State(state): State<SharedState>,
) -> Result<Json<RosterResponse>, AppError> {
    let names = roster_service::roster(&state).await?;
    Ok(Json(RosterResponse { names }))
}
