// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LearnHub storefront: backend-for-frontend for the LearnHub course
//! marketplace.
//!
//! This crate serves the storefront's JSON pages and checkout flows, and
//! proxies authentication and catalog calls to the LearnHub REST API.

pub mod config;
pub mod currency;
pub mod error;
pub mod flows;
pub mod middleware;
pub mod models;
pub mod payment_methods;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use flows::{CardCheckout, CheckoutRegistry, CheckoutSettings};
use services::{ApiClient, AuthService, CourseService, MobilePaymentsService, SessionStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub auth: AuthService,
    pub courses: CourseService,
    pub mobile_payments: MobilePaymentsService,
    pub card_checkout: CardCheckout,
    pub checkouts: CheckoutRegistry,
}

impl AppState {
    /// Build every service from `config`.
    pub fn from_config(config: Config) -> error::Result<Self> {
        let api = ApiClient::new(&config.api_base_url, config.api_timeout)?;

        Ok(Self {
            sessions: SessionStore::new(config.session_ttl),
            auth: AuthService::new(api.clone()),
            courses: CourseService::new(api.clone()),
            mobile_payments: MobilePaymentsService::new(api),
            card_checkout: CardCheckout::new(config.card_processing_delay),
            checkouts: CheckoutRegistry::new(),
            config,
        })
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            poll_interval: self.config.status_poll_interval,
            max_status_checks: self.config.max_status_checks,
        }
    }
}
