// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod api;
pub mod auth;
pub mod checkout;
pub mod pages;

use crate::currency::{detect_country, detect_currency, Currency};
use crate::error::{AppError, Result};
use crate::middleware::auth::require_session;
use crate::models::Session;
use crate::services::sessions::SessionStore;
use crate::AppState;
use axum::http::{header, HeaderMap, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

fn accept_language(headers: &HeaderMap) -> &str {
    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("")
}

/// Display currency: explicit `?currency=` (must be known), else from the
/// visitor's locale.
pub(crate) fn display_currency(headers: &HeaderMap, requested: Option<&str>) -> Result<Currency> {
    match requested.map(str::trim).filter(|code| !code.is_empty()) {
        Some(code) => Currency::from_code(code)
            .ok_or_else(|| AppError::BadRequest(format!("Unsupported currency: {}", code))),
        None => Ok(detect_currency(accept_language(headers))),
    }
}

/// Write back a session a handler changed. Fails if it was removed
/// (logged out or expired) while the request was in flight.
pub(crate) fn save_session(sessions: &SessionStore, id: &str, session: Session) -> Result<()> {
    if sessions.save(id, session) {
        Ok(())
    } else {
        Err(AppError::InvalidToken)
    }
}

/// Visitor country: explicit `?country=`, else the locale region, else the
/// configured default.
pub(crate) fn visitor_country(headers: &HeaderMap, requested: Option<&str>, default: &str) -> String {
    match requested.map(str::trim).filter(|country| !country.is_empty()) {
        Some(country) => country.to_ascii_uppercase(),
        None => detect_country(accept_language(headers), default),
    }
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
        ]);

    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .merge(auth::routes())
        .merge(api::public_routes())
        .merge(pages::public_routes());

    // Protected routes (signed-in session required)
    let protected_routes = Router::new()
        .merge(auth::session_routes())
        .merge(api::routes())
        .merge(checkout::routes())
        .merge(pages::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
