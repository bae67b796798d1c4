// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mobile-money payments client.
//!
//! Checkout flows talk to the payments backend through the
//! [`PaymentGateway`] trait so tests can substitute a scripted gateway.

use crate::error::{AppError, Result};
use crate::models::course::ListResponse;
use crate::models::{
    InitiatedPayment, PaymentInitiation, PaymentStatusReport, PhoneValidation, Provider,
    Transaction,
};
use crate::services::api::{segment, ApiClient};
use crate::services::sessions::SessionStore;
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Operations a mobile-money checkout needs from the payments backend.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Providers the user can pick from.
    async fn providers(&self) -> Result<Vec<Provider>>;

    /// Check a phone number and detect its carrier.
    async fn validate_phone(&self, phone_number: &str) -> Result<PhoneValidation>;

    /// Create a transaction for a course purchase.
    async fn initiate(&self, request: &PaymentInitiation) -> Result<InitiatedPayment>;

    /// Current status of a transaction.
    async fn status(&self, reference_code: &str) -> Result<PaymentStatusReport>;

    /// Cancel a transaction that has not reached a terminal status.
    async fn cancel(&self, reference_code: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ValidatePhoneRequest<'a> {
    phone_number: &'a str,
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
struct BoundSession {
    store: SessionStore,
    id: String,
}

/// Client for the `/mobile-payments/*` endpoints.
///
/// A client bound to a session reads the access token from the store on
/// every request, so a refreshed token is picked up by long-lived checkouts.
#[derive(Clone)]
pub struct MobilePaymentsService {
    api: ApiClient,
    session: Option<BoundSession>,
}

impl MobilePaymentsService {
    /// Anonymous client; only provider listing and phone validation work.
    pub fn new(api: ApiClient) -> Self {
        Self { api, session: None }
    }

    /// Client acting for the user signed in to session `session_id`.
    pub fn for_session(&self, sessions: &SessionStore, session_id: &str) -> Self {
        Self {
            api: self.api.clone(),
            session: Some(BoundSession {
                store: sessions.clone(),
                id: session_id.to_string(),
            }),
        }
    }

    fn token(&self) -> Result<String> {
        self.session
            .as_ref()
            .and_then(|bound| bound.store.load(&bound.id))
            .and_then(|session| session.access_token)
            .ok_or(AppError::Unauthorized)
    }

    /// The user's mobile-money history, newest first as the API orders it.
    pub async fn transactions(&self) -> Result<Vec<Transaction>> {
        let token = self.token()?;
        let transactions: ListResponse<Transaction> = self
            .api
            .get_json(
                "/mobile-payments/transactions/",
                Some(&token),
                "Failed to fetch transactions",
            )
            .await?;
        Ok(transactions.into_vec())
    }
}

#[async_trait]
impl PaymentGateway for MobilePaymentsService {
    async fn providers(&self) -> Result<Vec<Provider>> {
        let providers: ListResponse<Provider> = self
            .api
            .get_json(
                "/mobile-payments/providers/",
                None,
                "Failed to load payment providers",
            )
            .await?;
        Ok(providers.into_vec())
    }

    async fn validate_phone(&self, phone_number: &str) -> Result<PhoneValidation> {
        self.api
            .send_json(
                Method::POST,
                "/mobile-payments/validate-phone/",
                None,
                Some(&ValidatePhoneRequest { phone_number }),
                "Validation failed",
            )
            .await
    }

    async fn initiate(&self, request: &PaymentInitiation) -> Result<InitiatedPayment> {
        let token = self.token()?;
        let payment: InitiatedPayment = self
            .api
            .send_json(
                Method::POST,
                "/mobile-payments/initiate/",
                Some(&token),
                Some(request),
                "Payment initiation failed",
            )
            .await?;

        tracing::info!(
            reference = %payment.transaction.reference_code,
            provider = %request.provider,
            course_id = %request.course_id,
            "Mobile money payment initiated"
        );
        Ok(payment)
    }

    async fn status(&self, reference_code: &str) -> Result<PaymentStatusReport> {
        let token = self.token()?;
        self.api
            .get_json(
                &format!("/mobile-payments/status/{}/", segment(reference_code)),
                Some(&token),
                "Failed to check payment status",
            )
            .await
    }

    async fn cancel(&self, reference_code: &str) -> Result<String> {
        let token = self.token()?;
        let response: MessageResponse = self
            .api
            .send_json::<_, ()>(
                Method::POST,
                &format!("/mobile-payments/cancel/{}/", segment(reference_code)),
                Some(&token),
                None,
                "Failed to cancel payment",
            )
            .await?;

        tracing::info!(reference = %reference_code, "Mobile money payment cancelled");
        Ok(response.message)
    }
}
