// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - upstream API clients and session storage.

pub mod api;
pub mod auth;
pub mod courses;
pub mod mobile_payments;
pub mod sessions;

pub use api::ApiClient;
pub use auth::AuthService;
pub use courses::CourseService;
pub use mobile_payments::{MobilePaymentsService, PaymentGateway};
pub use sessions::SessionStore;
