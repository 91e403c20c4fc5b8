use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Tally Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::session::get_session,
        crate::routes::session::join_session,
        crate::routes::roster::get_roster,
        crate::routes::history::list_history,
        crate::routes::stats::get_standings,
        crate::routes::stats::get_podium,
        crate::routes::admin::start_session,
        crate::routes::admin::cancel_lobby,
        crate::routes::admin::leave_session,
        crate::routes::admin::adjust_level,
        crate::routes::admin::set_level,
        crate::routes::admin::add_round,
        crate::routes::admin::set_target_score,
        crate::routes::admin::end_session,
        crate::routes::admin::add_roster_entry,
        crate::routes::admin::remove_roster_entry,
        crate::routes::admin::delete_history_entry,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::common::SessionSnapshot,
            crate::dto::common::PlayerSnapshot,
            crate::dto::common::VisibleSessionPhase,
            crate::dto::session::JoinRequest,
            crate::dto::session::LeaveRequest,
            crate::dto::session::AdjustLevelRequest,
            crate::dto::session::SetLevelRequest,
            crate::dto::session::SetTargetRequest,
            crate::dto::session::EndSessionRequest,
            crate::dto::session::LevelUpdateResponse,
            crate::dto::session::AddRoundResponse,
            crate::dto::session::ActionResponse,
            crate::dto::roster::AddRosterEntryRequest,
            crate::dto::roster::RosterResponse,
            crate::dto::history::HistoryEntry,
            crate::dto::history::PlayerDetail,
            crate::dto::stats::PlayerStandingDto,
            crate::dto::stats::LeaderboardSlotDto,
            crate::dto::stats::PodiumDto,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events stream"),
        (name = "session", description = "Shared session reads and lobby joining"),
        (name = "roster", description = "Durable roster reads"),
        (name = "history", description = "History ledger reads"),
        (name = "stats", description = "Aggregated statistics"),
        (name = "admin", description = "Passphrase-gated session and ledger management"),
    )
)]
pub struct ApiDoc;
