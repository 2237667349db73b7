// ABOUTME: Aggregates "completed today" flags across heterogeneous activity logs
// ABOUTME: One data-driven query per source, run concurrently, failures isolated per source
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Completion Aggregator
//!
//! Every trackable category is described by a [`CompletionSourceConfig`]
//! record. The aggregator never branches on the category itself: it computes
//! the local day window once, queries each requested source through the same
//! [`ActivityLogSource`] call, and folds the rows into a boolean.
//!
//! A failing source yields `false` for its id and is reported in
//! [`CompletionReport::failures`]; it never fails the whole call.

/// SQLite-backed activity log
pub mod sqlite;

use crate::clock::{Clock, SystemClock};
use crate::errors::AppResult;
use crate::models::completion::default_completion_sources;
use crate::models::{ActivityRow, CompletionReport, CompletionSourceConfig, DayWindow, SourceFailure};
use crate::utils::shuffle::dedup_preserving_order;
use async_trait::async_trait;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Query access to the activity-log tables
#[async_trait]
pub trait ActivityLogSource: Send + Sync {
    /// Rows of one source owned by `user_id` that fall inside `window`
    async fn fetch_rows(
        &self,
        config: &CompletionSourceConfig,
        user_id: Uuid,
        window: &DayWindow,
    ) -> AppResult<Vec<ActivityRow>>;
}

/// Computes the per-category completed-today map
pub struct CompletionAggregator {
    log: Arc<dyn ActivityLogSource>,
    sources: Vec<CompletionSourceConfig>,
    clock: Arc<dyn Clock>,
}

impl CompletionAggregator {
    /// Aggregator over the built-in sources, using the system clock
    #[must_use]
    pub fn new(log: Arc<dyn ActivityLogSource>) -> Self {
        Self::with_sources(log, default_completion_sources(), Arc::new(SystemClock))
    }

    /// Aggregator over an explicit source list and clock
    #[must_use]
    pub fn with_sources(
        log: Arc<dyn ActivityLogSource>,
        sources: Vec<CompletionSourceConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            log,
            sources,
            clock,
        }
    }

    /// Configured sources
    #[must_use]
    pub fn sources(&self) -> &[CompletionSourceConfig] {
        &self.sources
    }

    /// Completed-today flag for every requested id
    ///
    /// Ids without a configured source map to `false`. Source failures map
    /// to `false` and are listed in the report.
    pub async fn get_completion_status<S: AsRef<str>>(
        &self,
        user_id: Uuid,
        exercise_ids: &[S],
    ) -> CompletionReport {
        let window = self.clock.day_window();
        let requested = dedup_preserving_order(exercise_ids);

        let mut report = CompletionReport::default();
        let mut lookups = Vec::with_capacity(requested.len());
        for id in requested {
            match self.sources.iter().find(|source| source.matches(&id)) {
                Some(source) => lookups.push((id, source)),
                None => {
                    debug!(user_id = %user_id, exercise_id = %id, "No completion source configured");
                    report.statuses.insert(id, false);
                }
            }
        }

        let results = join_all(lookups.iter().map(|(_, source)| {
            let window = &window;
            async move { self.log.fetch_rows(source, user_id, window).await }
        }))
        .await;

        for ((id, source), result) in lookups.into_iter().zip(results) {
            let completed = match result {
                Ok(rows) => source.is_completed_by(&rows),
                Err(e) => {
                    warn!(
                        user_id = %user_id,
                        source = %source.source_id,
                        error = %e,
                        "Completion source query failed"
                    );
                    report.failures.push(SourceFailure {
                        source_id: source.source_id.clone(),
                        message: e.to_string(),
                    });
                    false
                }
            };
            report.statuses.insert(id, completed);
        }

        debug!(
            user_id = %user_id,
            day = %window.day,
            requested = report.statuses.len(),
            failed = report.failures.len(),
            "Completion status aggregated"
        );
        report
    }
}
