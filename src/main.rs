// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LearnHub Storefront Server
//!
//! Serves storefront pages and checkout flows on top of the LearnHub REST
//! API.

use learnhub_storefront::{config::Config, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired sessions and finished checkouts are dropped.
const PURGE_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        api_base_url = %config.api_base_url,
        "Starting LearnHub storefront"
    );

    // Build shared state
    let state = Arc::new(AppState::from_config(config.clone())?);

    spawn_purge_task(state.clone());

    // Build router
    let app = learnhub_storefront::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

fn spawn_purge_task(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let sessions = state.sessions.purge_expired();
            let checkouts = state.checkouts.purge_closed();
            if sessions > 0 || checkouts > 0 {
                tracing::debug!(sessions, checkouts, "Purged stale sessions and checkouts");
            }
        }
    });
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), tracing_subscriber::filter::ParseError> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("learnhub_storefront=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
