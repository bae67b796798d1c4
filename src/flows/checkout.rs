// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Drives a [`MobileMoneyFlow`] against a [`PaymentGateway`].
//!
//! Once a transaction exists the checkout runs up to two background tasks:
//! - countdown: ticks every second (first tick immediate) until the
//!   transaction expires, then runs one status check
//! - poll: while on the status step, checks every poll interval
//!
//! Tasks hold only a `Weak` reference and are aborted on close, try-again,
//! a terminal status, or drop. Status checks never overlap: one that starts
//! while another is in flight is skipped, and a result that arrives after
//! close is discarded.

use crate::error::{AppError, Result};
use crate::flows::mobile_money::{FlowError, FlowStep, FlowView, MobileMoneyFlow, StatusOutcome};
use crate::models::{PhoneValidation, ProviderKind, Transaction, TransactionStatus};
use crate::services::PaymentGateway;
use crate::time_utils::deadline_for;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant};

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Called once with the confirmed transaction.
pub type SuccessCallback = Arc<dyn Fn(&Transaction) + Send + Sync>;

/// Timer settings for a checkout.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutSettings {
    pub poll_interval: Duration,
    /// Stop polling after this many checks (`None` = until closed)
    pub max_status_checks: Option<u32>,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            max_status_checks: None,
        }
    }
}

struct State {
    flow: MobileMoneyFlow,
    countdown: Option<JoinHandle<()>>,
    poll: Option<JoinHandle<()>>,
    deadline: Option<Instant>,
    status_checks: u32,
    outcome: Option<TransactionStatus>,
    submitting: bool,
}

impl State {
    fn stop_timers(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
        if let Some(handle) = self.poll.take() {
            handle.abort();
        }
    }

    fn close(&mut self) {
        self.stop_timers();
        self.deadline = None;
        self.submitting = false;
        self.flow.close();
    }
}

struct Inner {
    gateway: Arc<dyn PaymentGateway>,
    settings: CheckoutSettings,
    state: Mutex<State>,
    /// Held for the duration of a status check.
    check_lock: tokio::sync::Mutex<()>,
    on_success: Option<SuccessCallback>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        state.stop_timers();
    }
}

/// Handle to one open mobile-money checkout. Clones share state.
#[derive(Clone)]
pub struct MobileMoneyCheckout {
    inner: Arc<Inner>,
}

impl MobileMoneyCheckout {
    /// Open a checkout for `course_id` and load the provider list.
    pub async fn open(
        course_id: &str,
        gateway: Arc<dyn PaymentGateway>,
        settings: CheckoutSettings,
        on_success: Option<SuccessCallback>,
    ) -> Self {
        let mut flow = MobileMoneyFlow::new(course_id);
        match gateway.providers().await {
            Ok(providers) => flow.set_providers(providers),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load payment providers");
                flow.providers_failed();
            }
        }

        Self {
            inner: Arc::new(Inner {
                gateway,
                settings,
                state: Mutex::new(State {
                    flow,
                    countdown: None,
                    poll: None,
                    deadline: None,
                    status_checks: 0,
                    outcome: None,
                    submitting: false,
                }),
                check_lock: tokio::sync::Mutex::new(()),
                on_success,
            }),
        }
    }

    pub fn select_provider(&self, provider: ProviderKind) -> std::result::Result<(), FlowError> {
        self.inner.lock().flow.select_provider(provider)
    }

    pub fn continue_to_phone(&self) -> std::result::Result<(), FlowError> {
        self.inner.lock().flow.continue_from_provider()
    }

    pub fn back(&self) -> std::result::Result<(), FlowError> {
        self.inner.lock().flow.back()
    }

    pub fn set_phone_number(&self, phone_number: &str) -> std::result::Result<(), FlowError> {
        self.inner.lock().flow.set_phone_number(phone_number)
    }

    /// Validate the entered number and, if it checks out, start the payment.
    ///
    /// On success the flow is on the instructions step and the countdown
    /// is running.
    pub async fn submit_phone(&self) -> Result<()> {
        let phone_number = {
            let mut state = self.inner.lock();
            let phone_number = state.flow.check_phone_ready()?;
            if state.submitting {
                return Err(FlowError::Busy.into());
            }
            state.submitting = true;
            phone_number
        };

        let result = self.validate_and_initiate(&phone_number).await;

        let mut state = self.inner.lock();
        state.submitting = false;
        let payment = match result {
            Ok(payment) => payment,
            Err(e @ AppError::Flow(_)) => return Err(e),
            Err(e) => {
                if !state.flow.is_closed() {
                    state.flow.initiation_failed(&e.user_message());
                }
                return Err(e);
            }
        };
        if state.flow.is_closed() {
            tracing::debug!(
                reference = %payment.transaction.reference_code,
                "Checkout closed while initiating payment"
            );
            return Err(FlowError::Closed.into());
        }

        let expires_at = payment.transaction.expires_at;
        state.flow.begin_instructions(payment)?;
        self.start_countdown(&mut state, expires_at);
        Ok(())
    }

    async fn validate_and_initiate(
        &self,
        phone_number: &str,
    ) -> Result<crate::models::InitiatedPayment> {
        let validation = match self.inner.gateway.validate_phone(phone_number).await {
            Ok(validation) => validation,
            Err(e) => {
                tracing::warn!(error = %e, "Phone validation request failed");
                PhoneValidation {
                    is_valid: false,
                    formatted_phone: None,
                    detected_provider: None,
                    clean_phone: None,
                }
            }
        };

        let request = self
            .inner
            .lock()
            .flow
            .accept_phone_validation(&validation)?;
        self.inner.gateway.initiate(&request).await
    }

    /// "I've made payment": move to the status step and start polling.
    pub fn payment_made(&self) -> std::result::Result<(), FlowError> {
        let mut state = self.inner.lock();
        state.flow.confirm_payment_made()?;
        self.start_polling(&mut state);
        Ok(())
    }

    /// Reset a failed payment back to provider selection.
    pub fn try_again(&self) -> std::result::Result<(), FlowError> {
        let mut state = self.inner.lock();
        state.flow.try_again()?;
        state.stop_timers();
        state.deadline = None;
        state.status_checks = 0;
        state.outcome = None;
        Ok(())
    }

    /// Cancel the pending transaction upstream, then close.
    pub async fn cancel(&self) -> Result<()> {
        let reference = {
            let state = self.inner.lock();
            if state.flow.is_closed() {
                return Err(FlowError::Closed.into());
            }
            state
                .flow
                .transaction()
                .filter(|tx| !tx.status.is_terminal())
                .map(|tx| tx.reference_code.clone())
        };

        if let Some(reference) = reference {
            self.inner.gateway.cancel(&reference).await?;
            let mut state = self.inner.lock();
            state.outcome = Some(TransactionStatus::Cancelled);
        }
        self.close();
        Ok(())
    }

    /// Stop all timers and clear flow state. Idempotent.
    pub fn close(&self) {
        let mut state = self.inner.lock();
        if !state.flow.is_closed() {
            tracing::debug!(course_id = %state.flow.course_id(), "Closing mobile money checkout");
        }
        state.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().flow.is_closed()
    }

    pub fn step(&self) -> FlowStep {
        self.inner.lock().flow.step()
    }

    /// Final status once the checkout ended on one.
    pub fn outcome(&self) -> Option<TransactionStatus> {
        self.inner.lock().outcome
    }

    pub fn status_checks(&self) -> u32 {
        self.inner.lock().status_checks
    }

    /// Whether any timer task is still scheduled.
    pub fn has_active_timers(&self) -> bool {
        let state = self.inner.lock();
        let active = [&state.countdown, &state.poll]
            .into_iter()
            .flatten()
            .any(|handle| !handle.is_finished());
        active
    }

    /// Query the transaction status now.
    ///
    /// Returns `Ok(None)` when the check was skipped (another in flight, no
    /// transaction, closed, or the check budget is spent).
    pub async fn check_status(&self) -> Result<Option<TransactionStatus>> {
        Inner::check_status(&self.inner).await
    }

    pub fn view(&self) -> CheckoutView {
        let mut state = self.inner.lock();
        let time_left = state
            .deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()));
        CheckoutView {
            status_checks: state.status_checks,
            outcome: state.outcome,
            flow: state.flow.view(time_left),
        }
    }

    fn start_countdown(&self, state: &mut State, expires_at: chrono::DateTime<chrono::Utc>) {
        let deadline = deadline_for(expires_at);
        state.deadline = Some(deadline);
        if let Some(old) = state.countdown.take() {
            old.abort();
        }

        let weak = Arc::downgrade(&self.inner);
        state.countdown = Some(tokio::spawn(async move {
            let mut ticker = interval(COUNTDOWN_TICK);
            loop {
                ticker.tick().await;
                if Instant::now() >= deadline {
                    break;
                }
            }
            tracing::debug!("Payment window elapsed, checking status");
            run_check(&weak).await;
        }));
    }

    fn start_polling(&self, state: &mut State) {
        if state.poll.is_some() {
            return;
        }
        let period = self.inner.settings.poll_interval;
        let weak = Arc::downgrade(&self.inner);
        state.poll = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if !run_check(&weak).await {
                    break;
                }
            }
        }));
    }
}

/// One timer-driven check. Returns false once the checkout is gone.
async fn run_check(weak: &Weak<Inner>) -> bool {
    let Some(inner) = weak.upgrade() else {
        return false;
    };
    if let Err(e) = Inner::check_status(&inner).await {
        // Wait for the next tick.
        tracing::warn!(error = %e, "Payment status check failed");
    }
    let closed = inner.lock().flow.is_closed();
    !closed
}

impl Inner {
    async fn check_status(inner: &Arc<Inner>) -> Result<Option<TransactionStatus>> {
        let Ok(_guard) = inner.check_lock.try_lock() else {
            tracing::debug!("Status check already in flight, skipping");
            return Ok(None);
        };

        let reference = {
            let mut state = inner.lock();
            if state.flow.is_closed() {
                return Ok(None);
            }
            let Some(reference) = state.flow.transaction().map(|tx| tx.reference_code.clone())
            else {
                return Ok(None);
            };
            if let Some(max) = inner.settings.max_status_checks {
                if state.status_checks >= max {
                    tracing::warn!(reference = %reference, checks = max, "Status check budget spent");
                    state.stop_timers();
                    return Ok(None);
                }
            }
            state.status_checks += 1;
            reference
        };

        let report = inner.gateway.status(&reference).await?;

        let confirmed = {
            let mut state = inner.lock();
            if state.flow.is_closed() {
                tracing::debug!(reference = %reference, "Discarding status for closed checkout");
                return Ok(None);
            }
            match state.flow.apply_status(&report) {
                StatusOutcome::Confirmed => {
                    state.stop_timers();
                    state.outcome = Some(TransactionStatus::Confirmed);
                    state.flow.transaction().cloned()
                }
                StatusOutcome::Failed => {
                    tracing::info!(reference = %reference, status = ?report.status, "Mobile money payment failed");
                    state.stop_timers();
                    state.deadline = None;
                    None
                }
                StatusOutcome::Pending | StatusOutcome::Ignored => None,
            }
        };

        if let Some(transaction) = confirmed {
            tracing::info!(reference = %reference, "Mobile money payment confirmed");
            if let Some(on_success) = &inner.on_success {
                on_success(&transaction);
            }
            inner.lock().close();
        }

        Ok(Some(report.status))
    }
}

/// Checkout snapshot for the HTTP layer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckoutView {
    #[serde(flatten)]
    pub flow: FlowView,
    pub status_checks: u32,
    pub outcome: Option<TransactionStatus>,
}
