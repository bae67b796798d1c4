// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Display currencies and price conversion.
//!
//! Course prices are stored upstream in a USD-equivalent base unit. Each
//! display currency carries a fixed rate to USD; conversion divides by that
//! rate. Rates are approximate and only used for display.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Supported display currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Currency {
    Usd,
    Zmw,
    Zar,
    Kes,
    Ngn,
}

/// Static metadata for a currency.
#[derive(Debug, Clone, Serialize)]
pub struct CurrencyConfig {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    /// Value of one unit in USD
    pub exchange_rate: f64,
}

static CURRENCIES: [(Currency, CurrencyConfig); 5] = [
    (
        Currency::Usd,
        CurrencyConfig {
            code: "USD",
            symbol: "$",
            name: "US Dollar",
            exchange_rate: 1.0,
        },
    ),
    (
        Currency::Zmw,
        CurrencyConfig {
            code: "ZMW",
            symbol: "K",
            name: "Zambian Kwacha",
            exchange_rate: 0.037,
        },
    ),
    (
        Currency::Zar,
        CurrencyConfig {
            code: "ZAR",
            symbol: "R",
            name: "South African Rand",
            exchange_rate: 0.055,
        },
    ),
    (
        Currency::Kes,
        CurrencyConfig {
            code: "KES",
            symbol: "KSh",
            name: "Kenyan Shilling",
            exchange_rate: 0.0077,
        },
    ),
    (
        Currency::Ngn,
        CurrencyConfig {
            code: "NGN",
            symbol: "₦",
            name: "Nigerian Naira",
            exchange_rate: 0.0012,
        },
    ),
];

impl Currency {
    /// All supported currencies in display order.
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Zmw,
        Currency::Zar,
        Currency::Kes,
        Currency::Ngn,
    ];

    /// Strict lookup by ISO code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Currency> {
        let code = code.trim();
        CURRENCIES
            .iter()
            .find(|(_, cfg)| cfg.code.eq_ignore_ascii_case(code))
            .map(|(currency, _)| *currency)
    }

    /// Lookup that falls back to USD for unknown codes.
    pub fn from_code_or_usd(code: &str) -> Currency {
        Self::from_code(code).unwrap_or(Currency::Usd)
    }

    pub fn config(self) -> &'static CurrencyConfig {
        // CURRENCIES is indexed in declaration order of the enum.
        &CURRENCIES[self as usize].1
    }

    pub fn code(self) -> &'static str {
        self.config().code
    }

    /// Kwacha prices are shown without minor units.
    pub fn fraction_digits(self) -> usize {
        match self {
            Currency::Zmw => 0,
            _ => 2,
        }
    }

    /// Map an ISO 3166 region to its display currency.
    pub fn for_region(region: &str) -> Currency {
        match region.to_ascii_uppercase().as_str() {
            "ZM" => Currency::Zmw,
            "ZA" => Currency::Zar,
            "KE" => Currency::Kes,
            "NG" => Currency::Ngn,
            _ => Currency::Usd,
        }
    }
}

/// Convert a base (USD) amount into `currency` units.
pub fn to_currency_units(amount: f64, currency: Currency) -> f64 {
    amount / currency.config().exchange_rate
}

/// Convert between two currencies via USD. Unknown codes count as USD.
pub fn convert_price(amount: f64, from: &str, to: &str) -> f64 {
    let from = Currency::from_code_or_usd(from);
    let to = Currency::from_code_or_usd(to);
    amount * from.config().exchange_rate / to.config().exchange_rate
}

/// Format a base (USD) amount for display in the currency named by `code`.
///
/// Unknown codes silently format as USD.
pub fn format_price(amount: f64, code: &str) -> String {
    format_in(amount, Currency::from_code_or_usd(code))
}

/// Format a base (USD) amount for display in `currency`, en-US style.
pub fn format_in(amount: f64, currency: Currency) -> String {
    let converted = to_currency_units(amount, currency);
    let digits = format!("{:.*}", currency.fraction_digits(), converted.abs());
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = String::new();
    if converted < 0.0 && digits.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    match currency {
        Currency::Usd => out.push('$'),
        other => {
            out.push_str(other.code());
            out.push('\u{a0}');
        }
    }
    out.push_str(&group_thousands(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn group_thousands(whole: &str) -> String {
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Region subtag of the first language tag in an Accept-Language value.
///
/// `"en-ZM,en;q=0.9"` yields `Some("ZM")`.
pub fn primary_region(locale: &str) -> Option<String> {
    let first = locale.split(',').next()?.split(';').next()?.trim();
    first
        .split(['-', '_'])
        .nth(1)
        .filter(|region| region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()))
        .map(|region| region.to_ascii_uppercase())
}

/// Display currency inferred from a locale; USD when the region is unknown.
pub fn detect_currency(locale: &str) -> Currency {
    primary_region(locale)
        .map(|region| Currency::for_region(&region))
        .unwrap_or(Currency::Usd)
}

/// Country inferred from a locale, or `default` when absent.
pub fn detect_country(locale: &str, default: &str) -> String {
    primary_region(locale).unwrap_or_else(|| default.to_string())
}
