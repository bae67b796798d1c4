// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON API routes: profile, reference data, enrollment and course authoring.

use crate::currency::{Currency, CurrencyConfig};
use crate::error::{AppError, Result};
use crate::middleware::auth::CurrentSession;
use crate::models::{Course, Enrollment, NewCourse, ProfileUpdate, User, UserRole};
use crate::payment_methods::{available_payment_methods, PaymentMethodView};
use crate::routes::{display_currency, save_session, visitor_country};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Reference-data routes (no session needed).
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/currencies", get(get_currencies))
        .route("/api/payment-methods", get(get_payment_methods))
}

/// API routes (require a session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).patch(update_me))
        .route("/api/courses/{id}/enroll", post(enroll))
        .route("/api/instructor/courses", post(create_course))
}

// ─── User Profile ────────────────────────────────────────────

/// Get current user profile (refreshes the cached copy).
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<User>> {
    let CurrentSession { id, mut session } = current;
    let user = state.auth.current_user(&mut session).await?;
    save_session(&state.sessions, &id, session)?;
    Ok(Json(user))
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>> {
    let CurrentSession { id, mut session } = current;
    let user = state.auth.update_profile(&mut session, &update).await?;
    save_session(&state.sessions, &id, session)?;
    tracing::info!(user_id = %user.id, "Profile updated");
    Ok(Json(user))
}

// ─── Reference Data ──────────────────────────────────────────

async fn get_currencies() -> Json<Vec<&'static CurrencyConfig>> {
    Json(Currency::ALL.iter().map(|c| c.config()).collect())
}

#[derive(Deserialize)]
struct PaymentMethodsQuery {
    country: Option<String>,
    currency: Option<String>,
}

/// Payment methods usable from the visitor's country, optionally
/// restricted to those accepting `currency`.
async fn get_payment_methods(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<PaymentMethodsQuery>,
) -> Result<Json<Vec<PaymentMethodView>>> {
    let country = visitor_country(
        &headers,
        query.country.as_deref(),
        &state.config.default_country,
    );
    let currency = match query.currency.as_deref() {
        Some(code) => Some(display_currency(&headers, Some(code))?),
        None => None,
    };

    let methods = available_payment_methods(&country)
        .into_iter()
        .filter(|method| currency.is_none_or(|c| method.supports_currency(c)))
        .map(PaymentMethodView::from)
        .collect();
    Ok(Json(methods))
}

// ─── Courses ─────────────────────────────────────────────────

async fn enroll(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(course_id): Path<String>,
) -> Result<Json<Enrollment>> {
    let enrollment = state.courses.enroll(&current.session, &course_id).await?;
    Ok(Json(enrollment))
}

pub(crate) fn require_instructor(current: &CurrentSession) -> Result<()> {
    match current.session.role() {
        Some(UserRole::Instructor) => Ok(()),
        _ => Err(AppError::Forbidden("Instructor access required".to_string())),
    }
}

async fn create_course(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Json(course): Json<NewCourse>,
) -> Result<(StatusCode, Json<Course>)> {
    require_instructor(&current)?;
    if course.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if !course.price.is_finite() || course.price < 0.0 {
        return Err(AppError::Validation("Price must be zero or more".to_string()));
    }

    let created = state.courses.create_course(&current.session, &course).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
