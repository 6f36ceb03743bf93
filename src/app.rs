/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (PgPool, DrinkStore, TokenVerifier) → Router 組み立て
 * - Middleware の適用 (CORS / HTTP 横断)
 * - axum::serve() で起動
 */
use std::{panic, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repos::{DrinkStore, PgDrinkStore};
use crate::services::auth::build_token_verifier;
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,coffee_shop_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook() {
    // Keep the default hook (prints to stderr with location/payload).
    // The request itself is answered with a 500 envelope by CatchPanicLayer.
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");
        default_hook(info);
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    init_panic_hook();

    let config = Config::from_env()?;

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let store = PgDrinkStore::new(pool);
    store.migrate().await.context("failed to run migrations")?;

    if config.db_reset_on_start {
        let seed = store.reset_with_seed().await?;
        tracing::warn!(id = seed.id, "DB_RESET_ON_START: all drinks dropped, seed drink inserted");
    }

    let verifier = build_token_verifier(&config.auth)?;
    tracing::info!(jwks_url = %config.auth.jwks_url, issuer = %config.auth.issuer, "token verifier ready");

    let store: Arc<dyn DrinkStore> = Arc::new(store);
    Ok(AppState::new(store, verifier))
}

fn build_router(state: AppState, config: &Config) -> Router {
    middleware::cors::apply(build_app(state), config)
}

// Everything but CORS. Router tests drive this directly.
pub(crate) fn build_app(state: AppState) -> Router {
    middleware::http::apply(api::routes(&state).with_state(state))
}
