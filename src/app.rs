/*
 * Responsibility
 * - Config load → dependency construction → Router assembly
 * - Middleware application (HTTP infra / CORS / security headers / bearer auth)
 * - axum::serve() startup
 */
use std::{panic, process};

use anyhow::{Context, Result};
use axum::{Json, Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::v1::handlers::health::health;
use crate::config::Config;
use crate::state::AppState;
use crate::{api, middleware, services};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex: RUST_LOG=info,payroll_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get lost
        // (stderr can be hidden depending on how the process is launched).
        tracing::error!(?info, "panic");

        // Development: fail fast so the panic is noticed immediately.
        // Production: default behavior, keep the server running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        "starting payroll API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let auth = services::auth::build_auth_service(config)?;

    Ok(AppState::new(db, auth))
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Payroll Backend API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn build_router(state: AppState, config: &Config) -> Router {
    // Everything under /api/v1 requires a verified bearer token;
    // `/` and `/health` stay public.
    let v1 = middleware::auth::access::apply(api::v1::routes(), state.clone());

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", v1)
        .with_state(state);

    let router = middleware::cors::apply(router, config);
    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router)
}
