// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Checkout routes: one-step card payments and the mobile-money dialog.
//!
//! A mobile-money checkout lives server-side between requests. The client
//! opens one, then drives it with actions and polls its view; timers keep
//! running in the background until the checkout closes.

use crate::error::Result;
use crate::flows::{
    CardPaymentRequest, CheckoutView, FlowStep, MobileMoneyCheckout, PaymentReceipt,
    SuccessCallback,
};
use crate::middleware::auth::CurrentSession;
use crate::models::{Enrollment, ProviderKind, Transaction};
use crate::routes::{display_currency, visitor_country};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/checkout/card", post(card_checkout))
        .route("/api/checkout/mobile", post(open_mobile_checkout))
        .route(
            "/api/checkout/mobile/{id}",
            get(get_mobile_checkout).delete(close_mobile_checkout),
        )
        .route("/api/checkout/mobile/{id}/actions", post(mobile_checkout_action))
}

// ─── Card ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CheckoutQuery {
    country: Option<String>,
    currency: Option<String>,
}

#[derive(Serialize)]
struct CardCheckoutResponse {
    receipt: PaymentReceipt,
    enrollment: Enrollment,
}

/// Take a card or bank payment, then enroll the user.
async fn card_checkout(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    headers: HeaderMap,
    Query(query): Query<CheckoutQuery>,
    Json(request): Json<CardPaymentRequest>,
) -> Result<Json<CardCheckoutResponse>> {
    let country = visitor_country(
        &headers,
        query.country.as_deref(),
        &state.config.default_country,
    );
    let currency = display_currency(&headers, query.currency.as_deref())?;

    // Charge the catalog price; the client never names the amount.
    let course = state.courses.get(&request.course_id).await?.course;
    let receipt = state
        .card_checkout
        .process(&request, course.price, &country, currency)
        .await?;
    let enrollment = state
        .courses
        .enroll(&current.session, &request.course_id)
        .await?;

    tracing::info!(
        course_id = %request.course_id,
        method = ?receipt.method,
        amount = %receipt.amount,
        "Card payment accepted, user enrolled"
    );
    Ok(Json(CardCheckoutResponse {
        receipt,
        enrollment,
    }))
}

// ─── Mobile money ────────────────────────────────────────────

#[derive(Deserialize)]
struct OpenCheckoutRequest {
    course_id: String,
}

#[derive(Serialize)]
struct OpenCheckoutResponse {
    id: String,
    #[serde(flatten)]
    checkout: CheckoutView,
}

/// Open the mobile-money dialog for a course.
async fn open_mobile_checkout(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Json(request): Json<OpenCheckoutRequest>,
) -> Result<(StatusCode, Json<OpenCheckoutResponse>)> {
    let gateway = Arc::new(
        state
            .mobile_payments
            .for_session(&state.sessions, &current.id),
    );
    let user_id = current
        .session
        .user
        .as_ref()
        .map(|user| user.id.clone())
        .unwrap_or_default();
    let on_success: SuccessCallback = Arc::new(move |tx: &Transaction| {
        tracing::info!(
            user_id = %user_id,
            reference = %tx.reference_code,
            amount = tx.amount,
            currency = %tx.currency,
            "Mobile money payment completed"
        );
    });

    let checkout = MobileMoneyCheckout::open(
        &request.course_id,
        gateway,
        state.checkout_settings(),
        Some(on_success),
    )
    .await;
    let view = checkout.view();
    let id = state.checkouts.insert(&current.id, checkout)?;

    tracing::debug!(course_id = %request.course_id, "Opened mobile money checkout");
    Ok((
        StatusCode::CREATED,
        Json(OpenCheckoutResponse { id, checkout: view }),
    ))
}

async fn get_mobile_checkout(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> Result<Json<CheckoutView>> {
    let checkout = state.checkouts.get(&id, &current.id)?;
    Ok(Json(checkout.view()))
}

/// A user action in the mobile-money dialog.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum FlowAction {
    SelectProvider {
        provider: ProviderKind,
    },
    /// The dialog's primary button for the current step.
    Next,
    SetPhone {
        phone_number: String,
    },
    SubmitPhone {
        #[serde(default)]
        phone_number: Option<String>,
    },
    Back,
    PaymentMade,
    CheckStatus,
    TryAgain,
    Cancel,
}

async fn mobile_checkout_action(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(id): Path<String>,
    Json(action): Json<FlowAction>,
) -> Result<Json<CheckoutView>> {
    let checkout = state.checkouts.get(&id, &current.id)?;
    tracing::debug!(?action, step = %checkout.step(), "Mobile money checkout action");

    apply_action(&checkout, action).await?;
    Ok(Json(checkout.view()))
}

async fn apply_action(checkout: &MobileMoneyCheckout, action: FlowAction) -> Result<()> {
    match action {
        FlowAction::SelectProvider { provider } => checkout.select_provider(provider)?,
        FlowAction::Next => match checkout.step() {
            FlowStep::Provider => checkout.continue_to_phone()?,
            FlowStep::Phone => checkout.submit_phone().await?,
            FlowStep::Instructions => checkout.payment_made()?,
            FlowStep::Status => {
                checkout.check_status().await?;
            }
        },
        FlowAction::SetPhone { phone_number } => checkout.set_phone_number(&phone_number)?,
        FlowAction::SubmitPhone { phone_number } => {
            if let Some(phone_number) = phone_number {
                checkout.set_phone_number(&phone_number)?;
            }
            checkout.submit_phone().await?;
        }
        FlowAction::Back => checkout.back()?,
        FlowAction::PaymentMade => checkout.payment_made()?,
        FlowAction::CheckStatus => {
            checkout.check_status().await?;
        }
        FlowAction::TryAgain => checkout.try_again()?,
        FlowAction::Cancel => checkout.cancel().await?,
    }
    Ok(())
}

/// Close the dialog. Timers stop and the checkout is forgotten.
async fn close_mobile_checkout(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.checkouts.remove(&id, &current.id)?;
    Ok(StatusCode::NO_CONTENT)
}
