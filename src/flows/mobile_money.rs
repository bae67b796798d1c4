// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mobile-money checkout state machine.
//!
//! Steps run `provider -> phone -> instructions -> status`. The only backward
//! moves are "Back" (phone to provider) and "Try Again" (a failed status back
//! to provider with everything but the provider list reset).
//!
//! This type does no I/O and owns no timers; [`super::checkout`] drives it.

use crate::models::payment::format_phone_number;
use crate::models::{
    InitiatedPayment, PaymentInitiation, PaymentInstructions, PaymentStatusReport,
    PhoneValidation, Provider, ProviderKind, Transaction, TransactionStatus,
};
use crate::time_utils::format_countdown;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Checkout step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStep {
    Provider,
    Phone,
    Instructions,
    Status,
}

impl FlowStep {
    pub const ALL: [FlowStep; 4] = [
        FlowStep::Provider,
        FlowStep::Phone,
        FlowStep::Instructions,
        FlowStep::Status,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlowStep::Provider => "provider",
            FlowStep::Phone => "phone",
            FlowStep::Instructions => "instructions",
            FlowStep::Status => "status",
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a step sits relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepProgress {
    Done,
    Current,
    Upcoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub level: NoticeLevel,
}

impl Notice {
    fn new(title: &str, description: impl Into<String>, level: NoticeLevel) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            level,
        }
    }
}

/// A flow rule the user tripped over.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    #[error("Please select a mobile money provider")]
    NoProviderSelected,

    #[error("{0} is not an available provider")]
    UnavailableProvider(ProviderKind),

    #[error("Please enter your phone number")]
    MissingPhoneNumber,

    #[error("Please enter a valid Zambian phone number")]
    InvalidPhoneNumber,

    #[error("This number belongs to {detected}, not {selected}")]
    ProviderMismatch {
        detected: ProviderKind,
        selected: ProviderKind,
    },

    #[error("Cannot {action} during the {step} step")]
    WrongStep { action: &'static str, step: FlowStep },

    #[error("Another request for this checkout is in progress")]
    Busy,

    #[error("This checkout has been closed")]
    Closed,
}

impl FlowError {
    /// Toast title for the error.
    pub fn title(&self) -> &'static str {
        match self {
            FlowError::NoProviderSelected | FlowError::UnavailableProvider(_) => "Select Provider",
            FlowError::MissingPhoneNumber => "Enter Phone Number",
            FlowError::InvalidPhoneNumber => "Invalid Phone Number",
            FlowError::ProviderMismatch { .. } => "Provider Mismatch",
            FlowError::WrongStep { .. } | FlowError::Busy | FlowError::Closed => "Error",
        }
    }
}

/// What a status report did to the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// Still waiting for the user to approve on their phone.
    Pending,
    Confirmed,
    /// Failed, expired or cancelled; "Try Again" is now allowed.
    Failed,
    /// Report was for a different (or no) transaction.
    Ignored,
}

/// In-memory state of one mobile-money checkout.
#[derive(Debug, Clone)]
pub struct MobileMoneyFlow {
    course_id: String,
    step: FlowStep,
    providers: Vec<Provider>,
    selected: Option<ProviderKind>,
    phone_number: String,
    transaction: Option<Transaction>,
    instructions: Option<PaymentInstructions>,
    notices: Vec<Notice>,
    closed: bool,
}

impl MobileMoneyFlow {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            step: FlowStep::Provider,
            providers: Vec::new(),
            selected: None,
            phone_number: String::new(),
            transaction: None,
            instructions: None,
            notices: Vec::new(),
            closed: false,
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn selected_provider(&self) -> Option<ProviderKind> {
        self.selected
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    pub fn instructions(&self) -> Option<&PaymentInstructions> {
        self.instructions.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Remove and return pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn set_providers(&mut self, providers: Vec<Provider>) {
        self.providers = providers;
    }

    /// Provider list could not be fetched; the list stays empty.
    pub fn providers_failed(&mut self) {
        self.providers.clear();
        self.notices.push(Notice::new(
            "Error",
            "Failed to load payment providers",
            NoticeLevel::Error,
        ));
    }

    fn ensure_step(&self, expected: FlowStep, action: &'static str) -> Result<(), FlowError> {
        if self.closed {
            return Err(FlowError::Closed);
        }
        if self.step != expected {
            return Err(FlowError::WrongStep {
                action,
                step: self.step,
            });
        }
        Ok(())
    }

    /// Record a user-facing error for a blocked action.
    pub fn reject(&mut self, error: FlowError) -> FlowError {
        self.notices.push(Notice::new(
            error.title(),
            error.to_string(),
            NoticeLevel::Error,
        ));
        error
    }

    pub fn select_provider(&mut self, provider: ProviderKind) -> Result<(), FlowError> {
        self.ensure_step(FlowStep::Provider, "select a provider")?;
        if !self.providers.iter().any(|p| p.name == provider) {
            return Err(self.reject(FlowError::UnavailableProvider(provider)));
        }
        self.selected = Some(provider);
        Ok(())
    }

    /// provider -> phone. Requires a selection.
    pub fn continue_from_provider(&mut self) -> Result<(), FlowError> {
        self.ensure_step(FlowStep::Provider, "continue")?;
        if self.selected.is_none() {
            return Err(self.reject(FlowError::NoProviderSelected));
        }
        self.step = FlowStep::Phone;
        Ok(())
    }

    /// phone -> provider. The selection and number are kept.
    pub fn back(&mut self) -> Result<(), FlowError> {
        self.ensure_step(FlowStep::Phone, "go back")?;
        self.step = FlowStep::Provider;
        Ok(())
    }

    pub fn set_phone_number(&mut self, phone_number: &str) -> Result<(), FlowError> {
        self.ensure_step(FlowStep::Phone, "change the phone number")?;
        self.phone_number = phone_number.trim().to_string();
        Ok(())
    }

    /// The number to validate, or an error if none was entered.
    pub fn check_phone_ready(&mut self) -> Result<String, FlowError> {
        self.ensure_step(FlowStep::Phone, "submit a phone number")?;
        if self.phone_number.is_empty() {
            return Err(self.reject(FlowError::MissingPhoneNumber));
        }
        Ok(self.phone_number.clone())
    }

    /// Check the remote validation result and build the initiation request.
    pub fn accept_phone_validation(
        &mut self,
        validation: &PhoneValidation,
    ) -> Result<PaymentInitiation, FlowError> {
        self.ensure_step(FlowStep::Phone, "submit a phone number")?;
        let selected = match self.selected {
            Some(selected) => selected,
            None => return Err(self.reject(FlowError::NoProviderSelected)),
        };

        if !validation.is_valid {
            return Err(self.reject(FlowError::InvalidPhoneNumber));
        }

        let detected = validation.detected_provider.unwrap_or(ProviderKind::Unknown);
        if detected != selected {
            return Err(self.reject(FlowError::ProviderMismatch { detected, selected }));
        }

        Ok(PaymentInitiation {
            course_id: self.course_id.clone(),
            provider: selected,
            phone_number: self.phone_number.clone(),
        })
    }

    /// phone -> instructions with the newly created transaction.
    pub fn begin_instructions(&mut self, payment: InitiatedPayment) -> Result<(), FlowError> {
        self.ensure_step(FlowStep::Phone, "start a payment")?;
        self.transaction = Some(payment.transaction);
        self.instructions = Some(payment.instructions);
        self.step = FlowStep::Instructions;
        self.notices.push(Notice::new(
            "Payment Initiated",
            "Follow the instructions to complete your payment",
            NoticeLevel::Info,
        ));
        Ok(())
    }

    /// The initiate call failed; stay on the phone step.
    pub fn initiation_failed(&mut self, message: &str) {
        let description = if message.is_empty() {
            "Payment initiation failed"
        } else {
            message
        };
        self.notices
            .push(Notice::new("Error", description, NoticeLevel::Error));
    }

    /// instructions -> status ("I've made payment").
    pub fn confirm_payment_made(&mut self) -> Result<(), FlowError> {
        self.ensure_step(FlowStep::Instructions, "confirm payment")?;
        self.step = FlowStep::Status;
        Ok(())
    }

    /// Fold a status report into the transaction.
    pub fn apply_status(&mut self, report: &PaymentStatusReport) -> StatusOutcome {
        if self.closed {
            return StatusOutcome::Ignored;
        }
        let Some(transaction) = self.transaction.as_mut() else {
            return StatusOutcome::Ignored;
        };
        if transaction.reference_code != report.reference_code {
            return StatusOutcome::Ignored;
        }

        transaction.status = report.status;
        if let Some(expires_at) = report.expires_at {
            transaction.expires_at = expires_at;
        }

        match report.status {
            TransactionStatus::Confirmed => {
                self.notices.push(Notice::new(
                    "Payment Successful!",
                    "You now have access to the course",
                    NoticeLevel::Success,
                ));
                StatusOutcome::Confirmed
            }
            status if status.is_failure() => {
                self.notices.push(Notice::new(
                    "Payment Failed",
                    "Please try again or contact support",
                    NoticeLevel::Error,
                ));
                StatusOutcome::Failed
            }
            _ => StatusOutcome::Pending,
        }
    }

    /// Whether "Try Again" is offered.
    pub fn can_try_again(&self) -> bool {
        !self.closed
            && self.step == FlowStep::Status
            && self
                .transaction
                .as_ref()
                .is_some_and(|tx| tx.status.is_failure())
    }

    /// Failed status -> provider, keeping only the provider list.
    pub fn try_again(&mut self) -> Result<(), FlowError> {
        self.ensure_step(FlowStep::Status, "try again")?;
        if !self.can_try_again() {
            return Err(FlowError::WrongStep {
                action: "try again",
                step: self.step,
            });
        }
        let providers = std::mem::take(&mut self.providers);
        let notices = std::mem::take(&mut self.notices);
        *self = Self {
            providers,
            notices,
            ..Self::new(std::mem::take(&mut self.course_id))
        };
        Ok(())
    }

    /// Clear all state. Pending notices survive so the caller can show them.
    pub fn close(&mut self) {
        self.providers.clear();
        self.selected = None;
        self.phone_number.clear();
        self.transaction = None;
        self.instructions = None;
        self.closed = true;
    }

    /// Progress indicator for each step.
    pub fn progress(&self) -> Vec<StepView> {
        let current = self.step.index();
        FlowStep::ALL
            .iter()
            .map(|&step| StepView {
                step,
                progress: match step.index() {
                    i if i < current => StepProgress::Done,
                    i if i == current => StepProgress::Current,
                    _ => StepProgress::Upcoming,
                },
            })
            .collect()
    }

    /// Snapshot for rendering. Drains pending notices.
    pub fn view(&mut self, time_left: Option<Duration>) -> FlowView {
        FlowView {
            course_id: self.course_id.clone(),
            step: self.step,
            steps: self.progress(),
            providers: self.providers.iter().map(ProviderView::from).collect(),
            selected_provider: self.selected,
            phone_number: self.phone_number.clone(),
            formatted_phone: (!self.phone_number.is_empty())
                .then(|| format_phone_number(&self.phone_number)),
            transaction: self.transaction.clone(),
            instructions: self.instructions.clone(),
            time_left: time_left.map(format_countdown),
            can_try_again: self.can_try_again(),
            closed: self.closed,
            notices: self.take_notices(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub step: FlowStep,
    pub progress: StepProgress,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderView {
    pub name: ProviderKind,
    pub display_name: String,
    pub icon: &'static str,
    pub ussd_code: String,
}

impl From<&Provider> for ProviderView {
    fn from(provider: &Provider) -> Self {
        Self {
            name: provider.name,
            display_name: provider.display_name.clone(),
            icon: provider.name.icon(),
            ussd_code: provider.ussd_code.clone(),
        }
    }
}

/// Serializable flow snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct FlowView {
    pub course_id: String,
    pub step: FlowStep,
    pub steps: Vec<StepView>,
    pub providers: Vec<ProviderView>,
    pub selected_provider: Option<ProviderKind>,
    pub phone_number: String,
    pub formatted_phone: Option<String>,
    pub transaction: Option<Transaction>,
    pub instructions: Option<PaymentInstructions>,
    /// `m:ss` until the transaction expires
    pub time_left: Option<String>,
    pub can_try_again: bool,
    pub closed: bool,
    pub notices: Vec<Notice>,
}
