// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mobile-money payment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Mobile-money carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ProviderKind {
    Airtel,
    Mtn,
    Zamtel,
    #[serde(other)]
    Unknown,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Airtel => "airtel",
            ProviderKind::Mtn => "mtn",
            ProviderKind::Zamtel => "zamtel",
            ProviderKind::Unknown => "unknown",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ProviderKind::Airtel => "🔴",
            ProviderKind::Zamtel => "🟢",
            ProviderKind::Mtn => "🟡",
            ProviderKind::Unknown => "📱",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider reference data from `/mobile-payments/providers/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub name: ProviderKind,
    pub display_name: String,
    pub ussd_code: String,
    #[serde(default)]
    pub phone_prefixes: Vec<String>,
    #[serde(default)]
    pub instructions: String,
}

/// Transaction lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum TransactionStatus {
    Initiated,
    Pending,
    Confirmed,
    Failed,
    Expired,
    Cancelled,
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransactionStatus::Confirmed
                | TransactionStatus::Failed
                | TransactionStatus::Expired
                | TransactionStatus::Cancelled
        )
    }

    /// Terminal without success; the flow offers "Try Again".
    pub fn is_failure(self) -> bool {
        self.is_terminal() && self != TransactionStatus::Confirmed
    }
}

/// A mobile-money transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: String,
    pub reference_code: String,
    #[serde(deserialize_with = "crate::models::decimal::deserialize")]
    pub amount: f64,
    pub currency: String,
    pub provider_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub status: TransactionStatus,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub course_title: Option<String>,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

/// `/mobile-payments/validate-phone/` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneValidation {
    pub is_valid: bool,
    #[serde(default)]
    pub formatted_phone: Option<String>,
    #[serde(default)]
    pub detected_provider: Option<ProviderKind>,
    #[serde(default)]
    pub clean_phone: Option<String>,
}

/// USSD walkthrough returned with a new transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentInstructions {
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub ussd_code: Option<String>,
    #[serde(default)]
    pub estimated_time: Option<String>,
}

/// `/mobile-payments/initiate/` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentInitiation {
    pub course_id: String,
    pub provider: ProviderKind,
    pub phone_number: String,
}

/// `/mobile-payments/initiate/` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiatedPayment {
    pub transaction: Transaction,
    #[serde(default)]
    pub instructions: PaymentInstructions,
    #[serde(default)]
    pub message: Option<String>,
}

/// `/mobile-payments/status/{reference}/` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusReport {
    pub reference_code: String,
    pub status: TransactionStatus,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_expired: bool,
}

/// Strip formatting and country code from a Zambian number.
pub fn clean_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if let Some(rest) = digits.strip_prefix("260") {
        rest.to_string()
    } else if let Some(rest) = digits.strip_prefix('0') {
        rest.to_string()
    } else {
        digits
    }
}

/// `+260 97 712 3456` display form; other input is returned as-is.
pub fn format_phone_number(phone: &str) -> String {
    let clean = clean_phone_number(phone);
    if clean.len() == 9 {
        format!("+260 {} {} {}", &clean[..2], &clean[2..5], &clean[5..])
    } else {
        phone.to_string()
    }
}
