// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in, registration and session lifecycle routes.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::middleware::auth::{
    create_session_jwt, session_id_from_request, CurrentSession, SESSION_COOKIE,
};
use crate::models::{LoginCredentials, RegisterData, RegisterResponse, Session, User};
use crate::routes::save_session;
use crate::AppState;

/// Routes that work without a session.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
}

/// Routes that need a signed-in session.
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/refresh", post(refresh))
}

/// Login response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub user: User,
    /// Same value as the session cookie, for clients that send a bearer token
    pub session_token: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub success: bool,
}

fn session_cookie(state: &AppState, value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!state.config.frontend_url.starts_with("http://"))
        .build()
}

/// Sign in upstream and start a session.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(credentials): Json<LoginCredentials>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let mut session = Session::default();
    let user = state.auth.login(&mut session, &credentials).await?;

    let session_id = state.sessions.create(session)?;
    let token = create_session_jwt(
        &session_id,
        &state.config.session_signing_key,
        state.sessions.ttl(),
    )?;

    let jar = jar.add(session_cookie(&state, token.clone()));
    Ok((
        jar,
        Json(LoginResponse {
            user,
            session_token: token,
        }),
    ))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(data): Json<RegisterData>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let response = state.auth.register(&data).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// End the session, if any. Always clears the cookie.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> (CookieJar, Json<StatusResponse>) {
    if let Some(id) =
        session_id_from_request(&jar, &headers, &state.config.session_signing_key)
    {
        if let Some(mut session) = state.sessions.load(&id) {
            state.auth.logout(&mut session);
        }
        state.sessions.remove(&id);
        state.checkouts.close_for_owner(&id);
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(StatusResponse { success: true }))
}

/// Exchange the refresh token for a new upstream access token.
async fn refresh(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<StatusResponse>> {
    let CurrentSession { id, mut session } = current;
    state.auth.refresh_token(&mut session).await?;

    save_session(&state.sessions, &id, session)?;
    tracing::debug!("Access token refreshed");
    Ok(Json(StatusResponse { success: true }))
}
