// ABOUTME: Wall-clock abstraction in the user's local time
// ABOUTME: System clock for production and a settable clock for day-rollover and bucket tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use crate::models::{CalendarDay, DayWindow, TimeOfDayBucket};
use chrono::{DateTime, Duration, FixedOffset, Local};
use std::sync::{PoisonError, RwLock};

/// Source of the current local time
///
/// Calendar days, day windows, and hour buckets are all derived from one
/// `now()` so a single query cycle never straddles two days.
pub trait Clock: Send + Sync {
    /// Current local time with its UTC offset
    fn now(&self) -> DateTime<FixedOffset>;

    /// Current local calendar day
    fn today(&self) -> CalendarDay {
        CalendarDay::of(&self.now())
    }

    /// Window covering the current local day
    fn day_window(&self) -> DayWindow {
        DayWindow::containing(&self.now())
    }

    /// Current hour-of-day bucket
    fn time_bucket(&self) -> TimeOfDayBucket {
        TimeOfDayBucket::of(&self.now())
    }
}

/// Host wall clock in the host's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<FixedOffset>>,
}

impl ManualClock {
    /// Clock frozen at `now`
    #[must_use]
    pub const fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Clock frozen at an RFC 3339 timestamp
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the timestamp does not parse
    pub fn at(rfc3339: &str) -> AppResult<Self> {
        DateTime::parse_from_rfc3339(rfc3339)
            .map(Self::new)
            .map_err(|e| AppError::invalid_input(format!("invalid timestamp '{rfc3339}': {e}")))
    }

    /// Jump to a new instant
    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move forward by `delta`
    pub fn advance(&self, delta: Duration) {
        let mut guard = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *guard += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}
