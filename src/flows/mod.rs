// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Checkout flows (card and mobile money).

pub mod card;
pub mod checkout;
pub mod mobile_money;
pub mod registry;

pub use card::{CardCheckout, CardDetails, CardPaymentRequest, PaymentReceipt};
pub use checkout::{CheckoutSettings, CheckoutView, MobileMoneyCheckout, SuccessCallback};
pub use mobile_money::{FlowError, FlowStep, FlowView, MobileMoneyFlow, Notice};
pub use registry::CheckoutRegistry;
