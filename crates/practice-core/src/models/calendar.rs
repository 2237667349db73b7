// ABOUTME: Calendar-day scoping types in the user's local time
// ABOUTME: Day windows for completion queries and hour-of-day buckets for the fallback pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A date identified by year, month, and day in the user's local time zone
///
/// Distinct from a rolling 24-hour window: two instants an hour apart can sit
/// on different calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarDay {
    /// Year
    pub year: i32,
    /// Month (1-12)
    pub month: u32,
    /// Day of month (1-31)
    pub day: u32,
}

impl CalendarDay {
    /// Calendar day of a local timestamp
    #[must_use]
    pub fn of<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self::from_naive(instant.date_naive())
    }

    /// Calendar day of a naive date
    #[must_use]
    pub fn from_naive(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    /// Convert back to a naive date, if the components are valid
    #[must_use]
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Half-open window `[start, end)` covering one local calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    /// Local midnight
    pub start: DateTime<FixedOffset>,
    /// Local midnight plus 24 hours
    pub end: DateTime<FixedOffset>,
    /// The calendar day the window covers
    pub day: CalendarDay,
}

impl DayWindow {
    /// Window of the local day containing `now`
    #[must_use]
    pub fn containing(now: &DateTime<FixedOffset>) -> Self {
        let since_midnight = now.time().signed_duration_since(NaiveTime::MIN);
        let start = *now - since_midnight;
        Self {
            start,
            end: start + Duration::hours(24),
            day: CalendarDay::of(now),
        }
    }

    /// Whether an instant falls inside the window
    #[must_use]
    pub fn contains<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        let instant = instant.fixed_offset();
        instant >= self.start && instant < self.end
    }
}

/// Hour-of-day bucket used to pick time-appropriate fallback exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDayBucket {
    /// 06:00-11:59
    Morning,
    /// 12:00-17:59
    Afternoon,
    /// 18:00-23:59
    Evening,
    /// 00:00-05:59
    Night,
}

impl TimeOfDayBucket {
    /// All buckets in daily order
    pub const ALL: [Self; 4] = [Self::Morning, Self::Afternoon, Self::Evening, Self::Night];

    /// Bucket for an hour of the day (0-23)
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            18..=23 => Self::Evening,
            _ => Self::Night,
        }
    }

    /// Bucket for a local timestamp
    #[must_use]
    pub fn of<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self::from_hour(instant.hour())
    }

    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}
