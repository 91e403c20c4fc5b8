//! Tally Back binary entrypoint wiring REST, SSE, and storage layers.

use std::{env, net::SocketAddr};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_back::{
    config::AppConfig,
    routes,
    services::sse_events,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    spawn_status_broadcaster(app_state.clone());

    #[cfg(feature = "mongo-store")]
    spawn_storage_supervisor(app_state.clone()).await?;

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Launch the MongoDB supervisor task that installs the ledger store and keeps
/// retrying in the background when connectivity drops.
#[cfg(feature = "mongo-store")]
async fn spawn_storage_supervisor(state: SharedState) -> anyhow::Result<()> {
    use std::sync::Arc;

    use tally_back::{
        dao::ledger_store::{
            LedgerStore,
            mongodb::{MongoConfig, MongoLedgerStore},
        },
        dao::storage::StorageError,
        services::storage_supervisor,
    };

    let mongo_uri = env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
    let mongo_db = env::var("MONGO_DB").ok();

    let mongo_config = MongoConfig::from_uri(&mongo_uri, mongo_db.as_deref())
        .await
        .context("parsing MongoDB configuration")?;

    tokio::spawn(storage_supervisor::run(state, move || {
        let config = mongo_config.clone();
        async move {
            let store = MongoLedgerStore::connect(config)
                .await
                .map_err(StorageError::from)?;
            Ok(Arc::new(store) as Arc<dyn LedgerStore>)
        }
    }));

    Ok(())
}

/// Forward degraded-mode toggles to connected SSE observers.
fn spawn_status_broadcaster(state: SharedState) {
    tokio::spawn(async move {
        let mut watcher = state.degraded_watcher();
        loop {
            if watcher.changed().await.is_err() {
                break;
            }
            let degraded = *watcher.borrow();
            sse_events::broadcast_system_status(&state, degraded);
        }
    });
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
