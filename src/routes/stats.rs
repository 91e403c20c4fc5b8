use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::stats::{LeaderboardSlotDto, PlayerStandingDto, PodiumDto},
    error::AppError,
    services::stats_service::{self, LeaderboardMetric},
    state::SharedState,
};

/// Aggregated statistics derived from the roster and the history ledger.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/stats", get(get_standings))
        .route("/stats/podium", get(get_podium))
}

/// Ranked standings table: matches, wins, and win rate per roster name.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses((status = 200, description = "Ranked standings", body = [PlayerStandingDto]))
)]
pub async fn get_standings(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PlayerStandingDto>>, AppError> {
    let standings = stats_service::standings(&state).await?;
    Ok(Json(standings.into_iter().map(Into::into).collect()))
}

/// Leaderboard extraction for all three metrics, ties included.
#[utoipa::path(
    get,
    path = "/stats/podium",
    tag = "stats",
    responses((status = 200, description = "Leaderboards per metric", body = PodiumDto))
)]
pub async fn get_podium(State(state): State<SharedState>) -> Result<Json<PodiumDto>, AppError> {
    let standings = stats_service::standings(&state).await?;

    let podium = PodiumDto {
        matches: LeaderboardSlotDto::from(stats_service::leaderboard(
            &standings,
            LeaderboardMetric::Matches,
        )),
        wins: LeaderboardSlotDto::from(stats_service::leaderboard(
            &standings,
            LeaderboardMetric::Wins,
        )),
        rate: LeaderboardSlotDto::from(stats_service::leaderboard(
            &standings,
            LeaderboardMetric::Rate,
        )),
    };

    Ok(Json(podium))
}
