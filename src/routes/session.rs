use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::{common::SessionSnapshot, session::JoinRequest},
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Public session routes: observing the shared state and claiming a lobby seat.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/join", post(join_session))
}

/// Observe the current session snapshot, including derived totals and winners.
#[utoipa::path(
    get,
    path = "/session",
    tag = "session",
    responses((status = 200, description = "Current session snapshot", body = SessionSnapshot))
)]
pub async fn get_session(State(state): State<SharedState>) -> Json<SessionSnapshot> {
    Json(session_service::capture_snapshot(&state).await)
}

/// Claim a lobby seat, opening the lobby when no session exists yet.
#[utoipa::path(
    post,
    path = "/session/join",
    tag = "session",
    request_body = JoinRequest,
    responses((status = 200, description = "Seat claimed", body = SessionSnapshot))
)]
pub async fn join_session(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<JoinRequest>>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = session_service::join(&state, &payload.name).await?;
    Ok(Json(snapshot))
}
