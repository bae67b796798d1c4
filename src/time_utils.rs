// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Countdown and deadline helpers.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Time remaining until `expires_at`, clamped at zero.
pub fn remaining_until(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (expires_at - now).to_std().unwrap_or(Duration::ZERO)
}

/// Translate a wall-clock expiry into a tokio deadline.
///
/// Timers run on tokio's clock so that paused-time tests control them.
pub fn deadline_for(expires_at: DateTime<Utc>) -> tokio::time::Instant {
    tokio::time::Instant::now() + remaining_until(expires_at, Utc::now())
}

/// Countdown display, `m:ss`.
pub fn format_countdown(remaining: Duration) -> String {
    let total = remaining.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}
