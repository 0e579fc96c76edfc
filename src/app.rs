/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用順 (内側から):
 *   guard (body limit/panic/timeout) → error responder → http (request-id/trace) → CORS
 * - axum::serve() で起動、SIGTERM/Ctrl+C で graceful shutdown
 */
use std::sync::Arc;

use anyhow::Result;
use axum::{Router, extract::OriginalUri};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware;
use crate::services::auth::{PgUserProvider, UserProvider};
use crate::services::errors::ErrorResponder;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,apikey_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    tracing::info!(
        "starting API in {:?} mode on {} (provider key: {})",
        config.app_env,
        config.addr,
        config.provider_key
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    let users: Arc<dyn UserProvider> = Arc::new(PgUserProvider::new(db));
    let responder = ErrorResponder::with_tracing(config.expose_error_details);

    Ok(AppState::new(users, &config.provider_key, responder))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let responder = state.responder.clone();

    let router = Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .fallback(fallback)
        .with_state(state);

    let router = middleware::http::guard(router);
    let router = middleware::error_responder::apply(router, responder);
    let router = middleware::http::apply(router);
    middleware::cors::apply(router, config)
}

async fn fallback(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::not_found(format!("No route found for \"{}\".", uri.path()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
