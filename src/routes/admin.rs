use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        common::SessionSnapshot,
        roster::{AddRosterEntryRequest, RosterResponse},
        session::{
            ActionResponse, AddRoundResponse, AdjustLevelRequest, EndSessionRequest,
            LeaveRequest, LevelUpdateResponse, SetLevelRequest, SetTargetRequest,
        },
    },
    error::AppError,
    services::{history_service, roster_service, session_service},
    state::SharedState,
};

const ADMIN_PASSPHRASE_HEADER: &str = "x-admin-passphrase";

/// Admin-only endpoints driving the session lifecycle, roster, and ledger.
///
/// Every route checks the shared passphrase header; target-score changes are
/// additionally re-confirmed in the request body.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/session/start", post(start_session))
        .route("/admin/session/cancel", post(cancel_lobby))
        .route("/admin/session/leave", post(leave_session))
        .route("/admin/session/level/adjust", post(adjust_level))
        .route("/admin/session/level/set", post(set_level))
        .route("/admin/session/rounds", post(add_round))
        .route("/admin/session/target", put(set_target_score))
        .route("/admin/session/end", post(end_session))
        .route("/admin/roster", post(add_roster_entry))
        .route("/admin/roster/{name}", delete(remove_roster_entry))
        .route("/admin/history/{id}", delete(delete_history_entry))
        .route_layer(middleware::from_fn_with_state(state, require_passphrase))
}

/// Begin the game with the current lobby.
#[utoipa::path(
    post,
    path = "/admin/session/start",
    tag = "admin",
    params(("X-Admin-Passphrase" = String, Header, description = "Shared admin passphrase")),
    responses((status = 200, description = "Game started", body = SessionSnapshot))
)]
pub async fn start_session(
    State(state): State<SharedState>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(session_service::start(&state).await?))
}

/// Abandon the lobby without playing.
#[utoipa::path(
    post,
    path = "/admin/session/cancel",
    tag = "admin",
    params(("X-Admin-Passphrase" = String, Header, description = "Shared admin passphrase")),
    responses((status = 200, description = "Lobby abandoned", body = ActionResponse))
)]
pub async fn cancel_lobby(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(session_service::cancel_lobby(&state).await?))
}

/// Remove a seated participant from the lobby.
#[utoipa::path(
    post,
    path = "/admin/session/leave",
    tag = "admin",
    params(("X-Admin-Passphrase" = String, Header, description = "Shared admin passphrase")),
    request_body = LeaveRequest,
    responses((status = 200, description = "Participant removed", body = SessionSnapshot))
)]
pub async fn leave_session(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<LeaveRequest>>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = session_service::leave(&state, payload.name.trim()).await?;
    Ok(Json(snapshot))
}

/// Increment or decrement one participant's value for one round.
#[utoipa::path(
    post,
    path = "/admin/session/level/adjust",
    tag = "admin",
    params(("X-Admin-Passphrase" = String, Header, description = "Shared admin passphrase")),
    request_body = AdjustLevelRequest,
    responses((status = 200, description = "Level adjusted", body = LevelUpdateResponse))
)]
pub async fn adjust_level(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<AdjustLevelRequest>>,
) -> Result<Json<LevelUpdateResponse>, AppError> {
    let response = session_service::adjust_level(
        &state,
        payload.name.trim(),
        payload.round,
        payload.delta,
    )
    .await?;
    Ok(Json(response))
}

/// Overwrite one participant's value for one round.
#[utoipa::path(
    post,
    path = "/admin/session/level/set",
    tag = "admin",
    params(("X-Admin-Passphrase" = String, Header, description = "Shared admin passphrase")),
    request_body = SetLevelRequest,
    responses((status = 200, description = "Level stored", body = LevelUpdateResponse))
)]
pub async fn set_level(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SetLevelRequest>>,
) -> Result<Json<LevelUpdateResponse>, AppError> {
    let response =
        session_service::set_level(&state, payload.name.trim(), payload.round, payload.value)
            .await?;
    Ok(Json(response))
}

/// Extend the session by one round for every participant.
#[utoipa::path(
    post,
    path = "/admin/session/rounds",
    tag = "admin",
    params(("X-Admin-Passphrase" = String, Header, description = "Shared admin passphrase")),
    responses((status = 200, description = "Round added", body = AddRoundResponse))
)]
pub async fn add_round(
    State(state): State<SharedState>,
) -> Result<Json<AddRoundResponse>, AppError> {
    Ok(Json(session_service::add_round(&state).await?))
}

/// Change the target score of the active session (double-gated).
#[utoipa::path(
    put,
    path = "/admin/session/target",
    tag = "admin",
    params(("X-Admin-Passphrase" = String, Header, description = "Shared admin passphrase")),
    request_body = SetTargetRequest,
    responses((status = 200, description = "Target changed", body = SessionSnapshot))
)]
pub async fn set_target_score(
    State(state): State<SharedState>,
    Json(payload): Json<SetTargetRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot =
        session_service::set_target_score(&state, &payload.passphrase, payload.value).await?;
    Ok(Json(snapshot))
}

/// Terminate the session, archiving a result when winners are named.
#[utoipa::path(
    post,
    path = "/admin/session/end",
    tag = "admin",
    params(("X-Admin-Passphrase" = String, Header, description = "Shared admin passphrase")),
    request_body = EndSessionRequest,
    responses((status = 200, description = "Session ended", body = ActionResponse))
)]
pub async fn end_session(
    State(state): State<SharedState>,
    Json(payload): Json<EndSessionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(session_service::end(&state, payload.winners).await?))
}

/// Append one name to the durable roster.
#[utoipa::path(
    post,
    path = "/admin/roster",
    tag = "admin",
    params(("X-Admin-Passphrase" = String, Header, description = "Shared admin passphrase")),
    request_body = AddRosterEntryRequest,
    responses((status = 200, description = "Roster after the addition", body = RosterResponse))
)]
pub async fn add_roster_entry(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<AddRosterEntryRequest>>,
) -> Result<Json<RosterResponse>, AppError> {
    let names = roster_service::add(&state, &payload.name).await?;
    Ok(Json(RosterResponse { names }))
}

/// Remove one name from the durable roster.
#[utoipa::path(
    delete,
    path = "/admin/roster/{name}",
    tag = "admin",
    params(("X-Admin-Passphrase" = String, Header, description = "Shared admin passphrase"),
    ("name" = String, Path, description = "Roster name to remove")),
    responses((status = 200, description = "Roster after the removal", body = RosterResponse))
)]
pub async fn remove_roster_entry(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<RosterResponse>, AppError> {
    let names = roster_service::remove(&state, &name).await?;
    Ok(Json(RosterResponse { names }))
}

/// Delete one history ledger entry.
#[utoipa::path(
    delete,
    path = "/admin/history/{id}",
    tag = "admin",
    params(("X-Admin-Passphrase" = String, Header, description = "Shared admin passphrase"),
    ("id" = String, Path, description = "Identifier of the ledger entry to delete")),
    responses((status = 204, description = "Entry deleted"))
)]
pub async fn delete_history_entry(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    history_service::delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reject requests whose passphrase header does not match the configured one.
///
/// No lockout or backoff: the passphrase is a shared convention for a trusted
/// co-located group, not a security boundary.
async fn require_passphrase(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_PASSPHRASE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| {
            AppError::Unauthorized("missing passphrase header `X-Admin-Passphrase`".into())
        })?;

    if provided == state.config().admin_passphrase() {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("passphrase mismatch".into()))
    }
}
