// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Open mobile-money checkouts, keyed by flow id and owned by a session.

use crate::error::{AppError, Result};
use crate::flows::MobileMoneyCheckout;
use crate::services::sessions::random_id;
use dashmap::DashMap;
use ring::rand::SystemRandom;
use std::sync::Arc;

const FLOW_ID_BYTES: usize = 16;

#[derive(Clone)]
struct Entry {
    owner: String,
    checkout: MobileMoneyCheckout,
}

/// Shared checkout map, cheap to clone.
///
/// A session has at most one open checkout; opening another closes the
/// previous one, like dismissing a payment dialog.
#[derive(Clone)]
pub struct CheckoutRegistry {
    entries: Arc<DashMap<String, Entry>>,
    rng: SystemRandom,
}

impl Default for CheckoutRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutRegistry {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            rng: SystemRandom::new(),
        }
    }

    /// Register `checkout` for session `owner` and return its flow id.
    pub fn insert(&self, owner: &str, checkout: MobileMoneyCheckout) -> Result<String> {
        self.close_for_owner(owner);
        self.purge_closed();

        let id = random_id(&self.rng, FLOW_ID_BYTES)?;
        self.entries.insert(
            id.clone(),
            Entry {
                owner: owner.to_string(),
                checkout,
            },
        );
        Ok(id)
    }

    /// Checkout `id`, if it belongs to `owner`.
    pub fn get(&self, id: &str, owner: &str) -> Result<MobileMoneyCheckout> {
        self.entries
            .get(id)
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.checkout.clone())
            .ok_or_else(|| AppError::NotFound(format!("Checkout {}", id)))
    }

    /// Close and forget checkout `id`.
    pub fn remove(&self, id: &str, owner: &str) -> Result<()> {
        let (_, entry) = self
            .entries
            .remove_if(id, |_, entry| entry.owner == owner)
            .ok_or_else(|| AppError::NotFound(format!("Checkout {}", id)))?;
        entry.checkout.close();
        Ok(())
    }

    /// Close every checkout owned by `owner` (e.g. at logout).
    pub fn close_for_owner(&self, owner: &str) {
        self.entries.retain(|_, entry| {
            if entry.owner == owner {
                entry.checkout.close();
                false
            } else {
                true
            }
        });
    }

    /// Forget checkouts that already closed (paid, cancelled).
    pub fn purge_closed(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.checkout.is_closed());
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
