//! Ritual Quiz Back binary entrypoint wiring REST, WebSocket, SSE and storage layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::{Context, bail};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ritual_quiz_back::{
    config::AppConfig,
    dao::{quiz_store::QuizStore, storage::StorageError},
    routes,
    services::{broadcast_service, storage_supervisor},
    state::{AppState, SharedState},
};

#[cfg(feature = "sqlite-store")]
const DEFAULT_SQLITE_PATH: &str = "ritual_quiz.db";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    spawn_storage_supervisor(app_state.clone())?;
    broadcast_service::spawn(app_state.clone());

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

/// Start the storage supervisor for the backend selected by `STORE_BACKEND`.
fn spawn_storage_supervisor(state: SharedState) -> anyhow::Result<()> {
    let backend = env::var("STORE_BACKEND").unwrap_or_else(|_| "sqlite".into());
    match backend.to_ascii_lowercase().as_str() {
        "sqlite" => spawn_sqlite_supervisor(state),
        "mongo" | "mongodb" => spawn_mongo_supervisor(state),
        other => bail!("unknown STORE_BACKEND `{other}` (expected `sqlite` or `mongo`)"),
    }
}

#[cfg(feature = "sqlite-store")]
fn spawn_sqlite_supervisor(state: SharedState) -> anyhow::Result<()> {
    let path = env::var("SQLITE_PATH").unwrap_or_else(|_| DEFAULT_SQLITE_PATH.into());
    info!(path = %path, "using SQLite storage backend");
    tokio::spawn(storage_supervisor::run(state, move || open_sqlite(path.clone())));
    Ok(())
}

#[cfg(feature = "sqlite-store")]
async fn open_sqlite(path: String) -> Result<Arc<dyn QuizStore>, StorageError> {
    use ritual_quiz_back::dao::quiz_store::sqlite::SqliteQuizStore;

    let store = tokio::task::spawn_blocking(move || SqliteQuizStore::open(&path))
        .await
        .map_err(|err| StorageError::unavailable("SQLite open task failed".into(), err))??;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite-store"))]
fn spawn_sqlite_supervisor(_state: SharedState) -> anyhow::Result<()> {
    bail!("SQLite backend requested but the `sqlite-store` feature is disabled")
}

#[cfg(feature = "mongo-store")]
fn spawn_mongo_supervisor(state: SharedState) -> anyhow::Result<()> {
    info!("using MongoDB storage backend");
    tokio::spawn(storage_supervisor::run(state, connect_mongo));
    Ok(())
}

#[cfg(feature = "mongo-store")]
async fn connect_mongo() -> Result<Arc<dyn QuizStore>, StorageError> {
    use ritual_quiz_back::dao::quiz_store::mongodb::{MongoConfig, MongoQuizStore};

    let config = MongoConfig::from_env().await?;
    let store = MongoQuizStore::connect(config).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mongo-store"))]
fn spawn_mongo_supervisor(_state: SharedState) -> anyhow::Result<()> {
    bail!("MongoDB backend requested but the `mongo-store` feature is disabled")
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
