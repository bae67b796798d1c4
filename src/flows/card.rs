// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Card and other single-step payment methods.
//!
//! There is no card processor behind this: the payment is accepted after a
//! fixed processing delay. Mobile-money methods go through
//! [`super::MobileMoneyCheckout`] instead.

use crate::currency::{format_in, Currency};
use crate::error::{AppError, Result};
use crate::payment_methods::{find_available, PaymentMethodId, PaymentMethodKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::{Validate, ValidationError};

/// Card form fields.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CardDetails {
    #[validate(length(min = 1, message = "Cardholder name is required"))]
    pub card_name: String,
    #[validate(custom(function = "validate_card_number"))]
    pub card_number: String,
    #[validate(custom(function = "validate_expiry"))]
    pub expiry_date: String,
    #[validate(custom(function = "validate_cvv"))]
    pub cvv: String,
}

fn digits_only(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace() && *c != '-').collect()
}

fn validate_card_number(number: &str) -> std::result::Result<(), ValidationError> {
    let digits = digits_only(number);
    if (12..=19).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("card_number").with_message("Enter a valid card number".into()))
    }
}

fn validate_expiry(expiry: &str) -> std::result::Result<(), ValidationError> {
    let invalid =
        || ValidationError::new("expiry_date").with_message("Expiry date must be MM/YY".into());
    let (month, year) = expiry.trim().split_once('/').ok_or_else(invalid)?;
    if month.len() != 2 || year.len() != 2 || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    match month.parse::<u8>() {
        Ok(1..=12) => Ok(()),
        _ => Err(invalid()),
    }
}

fn validate_cvv(cvv: &str) -> std::result::Result<(), ValidationError> {
    if (3..=4).contains(&cvv.len()) && cvv.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("cvv").with_message("CVV must be 3 or 4 digits".into()))
    }
}

/// A payment request for one course.
#[derive(Debug, Clone, Deserialize)]
pub struct CardPaymentRequest {
    pub course_id: String,
    pub method: PaymentMethodId,
    #[serde(default)]
    pub card: Option<CardDetails>,
}

/// Result of a completed single-step payment.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub course_id: String,
    pub method: PaymentMethodId,
    pub currency: Currency,
    /// Amount charged, formatted in `currency`
    pub amount: String,
}

/// Simulated single-step checkout.
#[derive(Debug, Clone)]
pub struct CardCheckout {
    processing_delay: Duration,
}

impl CardCheckout {
    pub fn new(processing_delay: Duration) -> Self {
        Self { processing_delay }
    }

    /// Validate the request for `country`, wait out the processing delay,
    /// and return a receipt for `price` (base units, from the catalog).
    pub async fn process(
        &self,
        request: &CardPaymentRequest,
        price: f64,
        country: &str,
        currency: Currency,
    ) -> Result<PaymentReceipt> {
        let method = find_available(request.method, country).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Payment method {:?} is not available in {}",
                request.method, country
            ))
        })?;

        match method.kind {
            PaymentMethodKind::MobileMoney => {
                return Err(AppError::BadRequest(format!(
                    "{} payments use the mobile money checkout",
                    method.name
                )));
            }
            PaymentMethodKind::Card => {
                let card = request
                    .card
                    .as_ref()
                    .ok_or_else(|| AppError::Validation("Card details are required".to_string()))?;
                card.validate().map_err(|e| {
                    AppError::Validation(crate::models::user::validation_message(&e))
                })?;
            }
            PaymentMethodKind::BankTransfer => {}
        }

        if !price.is_finite() || price < 0.0 {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Course {} has invalid price {}",
                request.course_id,
                price
            )));
        }

        tracing::info!(
            course_id = %request.course_id,
            method = ?request.method,
            country,
            "Processing payment"
        );
        tokio::time::sleep(self.processing_delay).await;

        Ok(PaymentReceipt {
            course_id: request.course_id.clone(),
            method: request.method,
            currency,
            amount: format_in(price, currency),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> CardDetails {
        CardDetails {
            card_name: "Ada Banda".to_string(),
            card_number: "4242 4242 4242 4242".to_string(),
            expiry_date: "12/28".to_string(),
            cvv: "123".to_string(),
        }
    }

    fn request(method: PaymentMethodId, card: Option<CardDetails>) -> CardPaymentRequest {
        CardPaymentRequest {
            course_id: "c1".to_string(),
            method,
            card,
        }
    }

    #[test]
    fn test_card_validation() {
        assert!(card().validate().is_ok());

        let mut bad = card();
        bad.card_number = "4242".to_string();
        bad.expiry_date = "13/28".to_string();
        bad.cvv = "12a".to_string();
        let message = crate::models::user::validation_message(&bad.validate().unwrap_err());
        assert_eq!(
            message,
            "CVV must be 3 or 4 digits, Enter a valid card number, Expiry date must be MM/YY"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_card_payment_waits_and_succeeds() {
        let checkout = CardCheckout::new(Duration::from_secs(2));
        let start = tokio::time::Instant::now();
        let receipt = checkout
            .process(
                &request(PaymentMethodId::Stripe, Some(card())),
                100.0,
                "ZM",
                Currency::Zmw,
            )
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(receipt.amount, "ZMW\u{a0}2,703");
    }

    #[tokio::test]
    async fn test_mobile_money_method_rejected() {
        let checkout = CardCheckout::new(Duration::ZERO);
        let err = checkout
            .process(&request(PaymentMethodId::AirtelMoney, None), 100.0, "ZM", Currency::Zmw)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_unavailable_method_rejected() {
        let checkout = CardCheckout::new(Duration::ZERO);
        let err = checkout
            .process(&request(PaymentMethodId::ZamtelKwacha, None), 100.0, "US", Currency::Usd)
            .await
            .unwrap_err();
        assert!(err.user_message().contains("not available"));
    }

    #[tokio::test]
    async fn test_card_details_required() {
        let checkout = CardCheckout::new(Duration::ZERO);
        let err = checkout
            .process(&request(PaymentMethodId::Stripe, None), 100.0, "US", Currency::Usd)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_request_ignores_client_amount() {
        let request: CardPaymentRequest = serde_json::from_value(serde_json::json!({
            "course_id": "c1",
            "method": "paypal",
            "amount": 0.01
        }))
        .unwrap();
        assert_eq!(request.course_id, "c1");
        assert_eq!(request.method, PaymentMethodId::Paypal);
        assert!(request.card.is_none());
    }
}
