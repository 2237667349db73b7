// ABOUTME: Shared test utilities and fakes for integration tests
// ABOUTME: Provides logging setup, fixed clocks, catalogs, and scriptable scorer/store/log doubles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_errors_doc
)]
//! Shared test utilities for `daily_practice`

use async_trait::async_trait;
use daily_practice::catalog::ExerciseCatalog;
use daily_practice::clock::ManualClock;
use daily_practice::completion::ActivityLogSource;
use daily_practice::errors::{AppError, AppResult};
use daily_practice::favorites::FavoritesRepository;
use daily_practice::models::{
    ActivityRow, CompletionSourceConfig, DayWindow, ExerciseDefinition, GeneratedPlan,
    RecommendationEntry, ScoredExercise, ScoringRequest, ScoringResponse,
};
use daily_practice::recommendations::{RecommendationScorer, RecommendationSource};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::sync::oneshot;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Clock frozen at an RFC 3339 instant
pub fn clock_at(rfc3339: &str) -> Arc<ManualClock> {
    Arc::new(ManualClock::at(rfc3339).unwrap())
}

/// Catalog whose entries are named after their ids
pub fn catalog_of(ids: &[&str]) -> ExerciseCatalog {
    ExerciseCatalog::new(
        ids.iter()
            .map(|id| ExerciseDefinition::new(*id, id.to_uppercase(), "Mindfulness"))
            .collect(),
    )
    .unwrap()
}

/// Ids of a list of entries, in order
pub fn ids_of(entries: &[RecommendationEntry]) -> Vec<String> {
    entries.iter().map(|entry| entry.exercise.id.clone()).collect()
}

/// Single-connection in-memory database
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

// ============================================================================
// Scorer
// ============================================================================

/// Scorer returning a configurable response after an optional delay
pub struct MockScorer {
    response: Mutex<Result<ScoringResponse, String>>,
    delay: Mutex<Duration>,
    calls: AtomicUsize,
}

impl MockScorer {
    pub fn unavailable() -> Self {
        Self::with_response(Err("scorer offline".to_owned()))
    }

    /// Successful response ranking `ids` in the given order
    pub fn ranking(ids: &[&str]) -> Self {
        Self::with_response(Ok(ScoringResponse {
            success: true,
            recommendations: ids
                .iter()
                .enumerate()
                .map(|(rank, id)| ScoredExercise {
                    exercise_id: (*id).to_owned(),
                    priority_score: 1.0 - rank as f64 / 10.0,
                    reasoning: format!("ranked {id}"),
                    personalization_note: None,
                    expected_benefit: None,
                })
                .collect(),
            focus_theme: Some("Calm focus".to_owned()),
            coach_note: Some("Start small".to_owned()),
        }))
    }

    pub fn with_response(response: Result<ScoringResponse, String>) -> Self {
        Self {
            response: Mutex::new(response),
            delay: Mutex::new(Duration::ZERO),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecommendationScorer for MockScorer {
    async fn score(&self, _request: &ScoringRequest) -> AppResult<ScoringResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let response = self.response.lock().unwrap().clone();
        response.map_err(AppError::scoring_unavailable)
    }
}

// ============================================================================
// Favorites repository
// ============================================================================

/// In-memory favorites with failure switches and read/write gates
#[derive(Default)]
pub struct MockFavoritesRepository {
    favorites: Mutex<HashMap<Uuid, Vec<String>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    read_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    write_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MockFavoritesRepository {
    pub fn with_favorites(user_id: Uuid, ids: &[&str]) -> Self {
        let repository = Self::default();
        repository.favorites.lock().unwrap().insert(
            user_id,
            ids.iter().map(|id| (*id).to_owned()).collect(),
        );
        repository
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make the next write wait until the returned sender fires
    pub fn hold_next_write(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.write_gates.lock().unwrap().push_back(gate);
        release
    }

    /// Make the next read snapshot the store, then wait until the returned sender fires
    pub fn hold_next_read(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.read_gates.lock().unwrap().push_back(gate);
        release
    }

    pub fn reads_started(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes_started(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn stored(&self, user_id: Uuid) -> Vec<String> {
        self.favorites
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl FavoritesRepository for MockFavoritesRepository {
    async fn list_favorites(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::database("favorites read failed"));
        }
        let snapshot = self.stored(user_id);
        self.reads.fetch_add(1, Ordering::SeqCst);
        let gate = self.read_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(snapshot)
    }

    async fn set_favorite(
        &self,
        user_id: Uuid,
        exercise_id: &str,
        is_favorite: bool,
    ) -> AppResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let gate = self.write_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::database("favorites write failed"));
        }

        let mut favorites = self.favorites.lock().unwrap();
        let ids = favorites.entry(user_id).or_default();
        ids.retain(|id| id != exercise_id);
        if is_favorite {
            ids.push(exercise_id.to_owned());
        }
        Ok(())
    }
}

// ============================================================================
// Recommendation source
// ============================================================================

/// Source producing plans tagged `generation-<n>` for the n-th call
#[derive(Default)]
pub struct ScriptedSource {
    calls: AtomicUsize,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    failures: Mutex<HashSet<usize>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the next unheld call wait until the returned sender fires
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.gates.lock().unwrap().push_back(gate);
        release
    }

    /// Make the n-th call (1-based) fail
    pub fn fail_call(&self, call: usize) {
        self.failures.lock().unwrap().insert(call);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Yield until at least `calls` generations have started
    pub async fn wait_for_calls(&self, calls: usize) {
        while self.calls() < calls {
            tokio::task::yield_now().await;
        }
    }
}

pub fn generation_label(call: usize) -> String {
    format!("generation-{call}")
}

#[async_trait]
impl RecommendationSource for ScriptedSource {
    async fn generate_plan(&self, _user_id: Uuid, count: usize) -> AppResult<GeneratedPlan> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.failures.lock().unwrap().contains(&call) {
            return Err(AppError::scoring_unavailable(format!("call {call} failed")));
        }

        let entries = (0..count)
            .map(|slot| {
                RecommendationEntry::fallback(ExerciseDefinition::new(
                    format!("exercise-{call}-{slot}"),
                    "Scripted",
                    "Mindfulness",
                ))
            })
            .collect();
        Ok(GeneratedPlan {
            entries,
            focus_theme: Some(generation_label(call)),
            coach_note: None,
        })
    }
}

// ============================================================================
// Activity log
// ============================================================================

/// Activity log answering from fixed rows, with per-source failures
#[derive(Default)]
pub struct MockActivityLog {
    rows: HashMap<String, Vec<ActivityRow>>,
    failing: HashSet<String>,
    queries: Mutex<Vec<(String, DayWindow)>>,
}

impl MockActivityLog {
    pub fn with_rows(mut self, source_id: &str, rows: Vec<ActivityRow>) -> Self {
        self.rows.insert(source_id.to_owned(), rows);
        self
    }

    pub fn failing(mut self, source_id: &str) -> Self {
        self.failing.insert(source_id.to_owned());
        self
    }

    /// Source ids queried so far, in completion order
    pub fn queried_sources(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(source, _)| source.clone())
            .collect()
    }

    pub fn windows(&self) -> Vec<DayWindow> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(_, window)| *window)
            .collect()
    }
}

/// Row carrying a completed flag
pub const fn flagged(completed: bool) -> ActivityRow {
    ActivityRow {
        completed: Some(completed),
    }
}

/// Row from a source without a flag field
pub const fn present() -> ActivityRow {
    ActivityRow { completed: None }
}

#[async_trait]
impl ActivityLogSource for MockActivityLog {
    async fn fetch_rows(
        &self,
        config: &CompletionSourceConfig,
        _user_id: Uuid,
        window: &DayWindow,
    ) -> AppResult<Vec<ActivityRow>> {
        self.queries
            .lock()
            .unwrap()
            .push((config.source_id.clone(), *window));
        if self.failing.contains(&config.source_id) {
            return Err(AppError::source_query(&config.source_id, "connection reset"));
        }
        Ok(self.rows.get(&config.source_id).cloned().unwrap_or_default())
    }
}
