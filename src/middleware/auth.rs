// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie authentication middleware.

use crate::models::Session;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "learnhub_session";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (opaque session id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Session loaded for the current request.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: String,
    pub session: Session,
}

/// Session id from the cookie or bearer token, if it carries a valid JWT.
pub fn session_id_from_request(
    jar: &CookieJar,
    headers: &axum::http::HeaderMap,
    signing_key: &[u8],
) -> Option<String> {
    // Try cookie first, then header
    let token = match jar.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string)?,
    };

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(&token, &key, &validation)
        .ok()
        .map(|data| data.claims.sub)
}

/// Middleware that requires a live, signed-in session.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let id = session_id_from_request(&jar, request.headers(), &state.config.session_signing_key)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let session = state.sessions.load(&id).ok_or_else(|| {
        tracing::debug!("Session cookie refers to an unknown or expired session");
        StatusCode::UNAUTHORIZED
    })?;
    if !session.is_authenticated() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    request
        .extensions_mut()
        .insert(CurrentSession { id, session });

    Ok(next.run(request).await)
}

/// Create the session cookie JWT for `session_id`.
pub fn create_session_jwt(
    session_id: &str,
    signing_key: &[u8],
    ttl: Duration,
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: session_id.to_string(),
        iat: now,
        exp: now + ttl.as_secs() as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
