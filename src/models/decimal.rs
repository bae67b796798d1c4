// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Serde helpers for upstream money fields.
//!
//! The API renders decimal columns as strings (`"89.99"`); older payloads
//! and tests may send plain numbers. Both decode to `f64`.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    fn parse<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Amount::Number(n) => Ok(n),
            Amount::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid decimal: {:?}", s))),
        }
    }
}

/// `#[serde(deserialize_with = "decimal::deserialize")]`
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Amount::deserialize(deserializer)?.parse()
}

/// Nullable variant; pair with `#[serde(default)]` for absent fields.
pub fn option<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Option::<Amount>::deserialize(deserializer)?
        .map(Amount::parse)
        .transpose()
}
