// ABOUTME: Completion-log source configuration and the aggregated "completed today" report
// ABOUTME: One config record per trackable category, processed uniformly by one query function
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::completion::{
    DEFAULT_USER_ID_FIELD, SOURCE_DEEP_WORK, SOURCE_JOURNAL, SOURCE_MINDFULNESS, SOURCE_TASKS,
    TABLE_DEEP_WORK_SESSIONS, TABLE_JOURNAL_ENTRIES, TABLE_MINDFULNESS_SESSIONS, TABLE_TASKS,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Boolean "completed today" per requested id
pub type CompletionStatusMap = BTreeMap<String, bool>;

/// How a source stores the moment an activity happened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampKind {
    /// An RFC 3339 instant, matched against the local day window
    #[default]
    Instant,
    /// A `YYYY-MM-DD` date, matched against the local calendar day
    CalendarDate,
}

/// Static description of one activity-log source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionSourceConfig {
    /// Category / source identifier callers ask about
    pub source_id: String,
    /// Table (or collection) holding the log rows
    pub table_name: String,
    /// Field holding the activity timestamp
    pub activity_timestamp_field: String,
    /// Field holding an explicit completed flag; absent means existence implies completion
    #[serde(default)]
    pub completed_flag_field: Option<String>,
    /// Field identifying the owning user
    #[serde(default = "default_user_id_field")]
    pub user_id_field: String,
    /// Semantic of the timestamp field
    #[serde(default)]
    pub timestamp_kind: TimestampKind,
}

fn default_user_id_field() -> String {
    DEFAULT_USER_ID_FIELD.to_owned()
}

impl CompletionSourceConfig {
    /// Config where the existence of a row is the completion signal
    pub fn new(
        source_id: impl Into<String>,
        table_name: impl Into<String>,
        activity_timestamp_field: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            table_name: table_name.into(),
            activity_timestamp_field: activity_timestamp_field.into(),
            completed_flag_field: None,
            user_id_field: default_user_id_field(),
            timestamp_kind: TimestampKind::Instant,
        }
    }

    /// Require a true flag on at least one row
    #[must_use]
    pub fn with_completed_flag(mut self, field: impl Into<String>) -> Self {
        self.completed_flag_field = Some(field.into());
        self
    }

    /// Override the user id field
    #[must_use]
    pub fn with_user_id_field(mut self, field: impl Into<String>) -> Self {
        self.user_id_field = field.into();
        self
    }

    /// Override the timestamp semantic
    #[must_use]
    pub const fn with_timestamp_kind(mut self, kind: TimestampKind) -> Self {
        self.timestamp_kind = kind;
        self
    }

    /// Whether a requested id addresses this source (case-insensitive)
    #[must_use]
    pub fn matches(&self, requested_id: &str) -> bool {
        self.source_id.eq_ignore_ascii_case(requested_id)
    }

    /// Reduce the rows of one day to a completion boolean
    ///
    /// Without a flag field any row counts; with one, at least one row must
    /// carry a true flag.
    #[must_use]
    pub fn is_completed_by(&self, rows: &[ActivityRow]) -> bool {
        if self.completed_flag_field.is_some() {
            rows.iter().any(|row| row.completed == Some(true))
        } else {
            !rows.is_empty()
        }
    }
}

/// Sources wired by default for the built-in exercise categories
#[must_use]
pub fn default_completion_sources() -> Vec<CompletionSourceConfig> {
    vec![
        CompletionSourceConfig::new(SOURCE_MINDFULNESS, TABLE_MINDFULNESS_SESSIONS, "completed_at")
            .with_completed_flag("completed"),
        CompletionSourceConfig::new(SOURCE_TASKS, TABLE_TASKS, "updated_at")
            .with_completed_flag("is_completed"),
        CompletionSourceConfig::new(SOURCE_JOURNAL, TABLE_JOURNAL_ENTRIES, "entry_date")
            .with_timestamp_kind(TimestampKind::CalendarDate),
        CompletionSourceConfig::new(SOURCE_DEEP_WORK, TABLE_DEEP_WORK_SESSIONS, "started_at")
            .with_completed_flag("completed"),
    ]
}

/// One log row, reduced to what completion needs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRow {
    /// Value of the completed flag, `None` when the source has no flag field
    pub completed: Option<bool>,
}

/// A source that could not be queried
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    /// Source that failed
    pub source_id: String,
    /// Failure message
    pub message: String,
}

/// Result of one completion query cycle
///
/// `statuses` always holds a boolean for every requested id. Ids whose
/// source failed are `false` there and listed in `failures`, so callers can
/// tell "not completed" from "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReport {
    /// Completed-today flag per requested id
    pub statuses: CompletionStatusMap,
    /// Sources that failed during this cycle
    pub failures: Vec<SourceFailure>,
}

impl CompletionReport {
    /// Flag for one id (`false` when it was not requested)
    #[must_use]
    pub fn is_completed(&self, id: &str) -> bool {
        self.statuses.get(id).copied().unwrap_or(false)
    }

    /// Whether any source failed
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Requested ids whose status is unknown because their source failed
    #[must_use]
    pub fn unknown_ids(&self) -> Vec<&str> {
        self.statuses
            .keys()
            .filter(|id| {
                self.failures
                    .iter()
                    .any(|failure| failure.source_id.eq_ignore_ascii_case(id))
            })
            .map(String::as_str)
            .collect()
    }
}
