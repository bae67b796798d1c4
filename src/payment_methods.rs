// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registry of checkout payment methods and their regional availability.

use crate::currency::Currency;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Payment method identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum PaymentMethodId {
    Stripe,
    MtnMomo,
    AirtelMoney,
    ZamtelKwacha,
    Paypal,
}

/// How a payment method collects funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum PaymentMethodKind {
    Card,
    MobileMoney,
    BankTransfer,
}

impl PaymentMethodKind {
    pub fn icon(self) -> &'static str {
        match self {
            PaymentMethodKind::Card => "credit-card",
            PaymentMethodKind::MobileMoney => "smartphone",
            PaymentMethodKind::BankTransfer => "building",
        }
    }
}

/// Where a method can be used.
#[derive(Debug, Clone, Copy)]
pub enum Availability {
    Global,
    Countries(&'static [&'static str]),
}

impl Availability {
    pub fn includes(&self, country: &str) -> bool {
        match self {
            Availability::Global => true,
            Availability::Countries(list) => list.iter().any(|c| c.eq_ignore_ascii_case(country)),
        }
    }
}

/// A checkout payment method.
#[derive(Debug, Clone)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: &'static str,
    pub kind: PaymentMethodKind,
    pub availability: Availability,
    /// Empty means any display currency.
    pub currencies: &'static [Currency],
    pub description: &'static str,
}

impl PaymentMethod {
    pub fn supports_currency(&self, currency: Currency) -> bool {
        self.currencies.is_empty() || self.currencies.contains(&currency)
    }
}

pub const PAYMENT_METHODS: &[PaymentMethod] = &[
    PaymentMethod {
        id: PaymentMethodId::Stripe,
        name: "Credit/Debit Card",
        kind: PaymentMethodKind::Card,
        availability: Availability::Global,
        currencies: &[],
        description: "Visa, Mastercard, American Express",
    },
    PaymentMethod {
        id: PaymentMethodId::MtnMomo,
        name: "MTN Mobile Money",
        kind: PaymentMethodKind::MobileMoney,
        availability: Availability::Countries(&["ZM", "UG", "GH", "CI", "CM", "BJ", "RW"]),
        currencies: &[Currency::Zmw],
        description: "Pay with MTN Mobile Money",
    },
    PaymentMethod {
        id: PaymentMethodId::AirtelMoney,
        name: "Airtel Money",
        kind: PaymentMethodKind::MobileMoney,
        availability: Availability::Countries(&[
            "ZM", "KE", "TZ", "UG", "RW", "MW", "MG", "TD", "NE",
        ]),
        currencies: &[Currency::Zmw, Currency::Kes],
        description: "Pay with Airtel Money",
    },
    PaymentMethod {
        id: PaymentMethodId::ZamtelKwacha,
        name: "Zamtel Kwacha",
        kind: PaymentMethodKind::MobileMoney,
        availability: Availability::Countries(&["ZM"]),
        currencies: &[Currency::Zmw],
        description: "Pay with Zamtel Kwacha",
    },
    PaymentMethod {
        id: PaymentMethodId::Paypal,
        name: "PayPal",
        kind: PaymentMethodKind::Card,
        availability: Availability::Global,
        currencies: &[],
        description: "Pay with PayPal account",
    },
];

/// Methods usable from `country`, in registry order.
pub fn available_payment_methods(country: &str) -> Vec<&'static PaymentMethod> {
    PAYMENT_METHODS
        .iter()
        .filter(|method| method.availability.includes(country))
        .collect()
}

/// Look up a method, only if it is usable from `country`.
pub fn find_available(id: PaymentMethodId, country: &str) -> Option<&'static PaymentMethod> {
    PAYMENT_METHODS
        .iter()
        .find(|method| method.id == id && method.availability.includes(country))
}

/// Serializable view of a payment method.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PaymentMethodView {
    pub id: PaymentMethodId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PaymentMethodKind,
    pub icon: String,
    pub description: String,
}

impl From<&PaymentMethod> for PaymentMethodView {
    fn from(method: &PaymentMethod) -> Self {
        Self {
            id: method.id,
            name: method.name.to_string(),
            kind: method.kind,
            icon: method.kind.icon().to_string(),
            description: method.description.to_string(),
        }
    }
}
