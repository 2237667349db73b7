// ABOUTME: Per-user, per-calendar-day cache of generated recommendations
// ABOUTME: Coalesces concurrent requests and discards superseded results via generation tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Recommendation Cache
//!
//! Each user owns one slot holding at most one plan, stamped with the local
//! calendar day it was generated for. A lookup on a different day is a miss.
//!
//! Every generation is tagged with a fresh token. Only the generation whose
//! token still matches the slot may write to it, so a slow, superseded
//! response can never rewind newer state. Callers that arrive while a
//! generation is in flight await the same shared future instead of issuing a
//! second scoring call. A superseded caller follows the newest in-flight
//! generation of the same size rather than returning outdated data; failing
//! that it gets its own result, never a plan of a different size.
//!
//! Slots are kept in an LRU map bounded by [`CacheConfig::max_users`].

use super::generator::RecommendationSource;
use crate::clock::Clock;
use crate::config::environment::CacheConfig;
use crate::constants::cache::{DEFAULT_CACHE_MAX_USERS, UNISSUED_TOKEN};
use crate::models::{
    CalendarDay, FetchState, GeneratedPlan, RecommendationCacheEntry, RecommendationResult,
};
use chrono::Utc;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

type GenerationOutcome = Result<GeneratedPlan, String>;
type SharedGeneration = Shared<BoxFuture<'static, GenerationOutcome>>;

struct InFlight {
    token: u64,
    count: usize,
    requested_on: CalendarDay,
    generation: SharedGeneration,
}

struct UserSlot {
    token: u64,
    state: FetchState,
    entry: Option<RecommendationCacheEntry>,
    error: Option<String>,
    in_flight: Option<InFlight>,
}

impl Default for UserSlot {
    fn default() -> Self {
        Self {
            token: UNISSUED_TOKEN,
            state: FetchState::Idle,
            entry: None,
            error: None,
            in_flight: None,
        }
    }
}

impl UserSlot {
    fn snapshot(&self) -> RecommendationResult {
        let mut result = self
            .entry
            .as_ref()
            .map(|entry| RecommendationResult::from_entry(entry, false))
            .unwrap_or_default();
        result.loading = self.in_flight.is_some();
        result.error.clone_from(&self.error);
        result
    }

    fn fresh_entry(&self, today: CalendarDay, count: usize) -> Option<&RecommendationCacheEntry> {
        (self.state == FetchState::Ready)
            .then_some(self.entry.as_ref())
            .flatten()
            .filter(|entry| entry.is_valid_for(today, count))
    }
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Users currently holding a slot
    pub users: usize,
    /// Requests answered from a same-day entry
    pub hits: u64,
    /// Requests that started a generation
    pub misses: u64,
    /// Requests that joined an in-flight generation
    pub coalesced: u64,
    /// Generations whose result was dropped because a newer token owned the slot
    pub discarded: u64,
}

/// Memoizes one plan per user per local calendar day
pub struct RecommendationCache {
    source: Arc<dyn RecommendationSource>,
    clock: Arc<dyn Clock>,
    slots: Mutex<LruCache<Uuid, UserSlot>>,
    next_token: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    discarded: AtomicU64,
}

impl RecommendationCache {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CACHE_MAX_USERS) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create an empty cache in front of a recommendation source
    #[must_use]
    pub fn new(
        source: Arc<dyn RecommendationSource>,
        clock: Arc<dyn Clock>,
        config: &CacheConfig,
    ) -> Self {
        let capacity = NonZeroUsize::new(config.max_users).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            source,
            clock,
            slots: Mutex::new(LruCache::new(capacity)),
            next_token: AtomicU64::new(UNISSUED_TOKEN + 1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Today's plan for a user, generating it when needed
    ///
    /// With `force_refresh` unset, a same-day entry for the same `count` is
    /// returned immediately and an in-flight generation for the same count,
    /// started on the same local day, is joined.
    /// Otherwise a new generation supersedes whatever is in flight.
    pub async fn get_or_generate(
        &self,
        user_id: Uuid,
        count: usize,
        force_refresh: bool,
    ) -> RecommendationResult {
        let today = self.clock.today();

        let (token, generation, owns_generation) = {
            let mut slots = self.slots.lock().await;
            let slot = slots.get_or_insert_mut(user_id, UserSlot::default);

            let joinable = if force_refresh {
                None
            } else {
                slot.in_flight
                    .as_ref()
                    .filter(|in_flight| in_flight.count == count && in_flight.requested_on == today)
                    .map(|in_flight| (in_flight.token, in_flight.generation.clone()))
            };

            if let Some((token, generation)) = joinable {
                self.coalesced.fetch_add(1, Ordering::Relaxed);
                debug!(user_id = %user_id, token, "Joining in-flight generation");
                (token, generation, false)
            } else {
                let cached = (!force_refresh && slot.state != FetchState::Failed)
                    .then_some(slot.entry.as_ref())
                    .flatten()
                    .filter(|entry| entry.is_valid_for(today, count));
                if let Some(entry) = cached {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(user_id = %user_id, day = %today, "Recommendation cache hit");
                    return RecommendationResult::from_entry(entry, true);
                }
                let (token, generation) = self.start_generation(slot, user_id, count, today);
                (token, generation, true)
            }
        };

        self.settle(user_id, count, token, generation, owns_generation)
            .await
    }

    /// Force the next request for this user to regenerate
    ///
    /// Clears the day-stamp of the cached entry and detaches any in-flight
    /// generation so that its result cannot land.
    pub async fn invalidate(&self, user_id: Uuid) {
        let mut slots = self.slots.lock().await;
        let Some(slot) = slots.peek_mut(&user_id) else {
            return;
        };

        if let Some(entry) = slot.entry.as_mut() {
            entry.calendar_day = None;
        }
        slot.token = self.next_token.fetch_add(1, Ordering::Relaxed);
        if slot.in_flight.take().is_some() {
            slot.state = FetchState::Idle;
        }
        debug!(user_id = %user_id, "Recommendation cache invalidated");
    }

    /// Current state of a user's slot without triggering generation
    pub async fn cached(&self, user_id: Uuid) -> Option<RecommendationResult> {
        self.slots.lock().await.peek(&user_id).map(UserSlot::snapshot)
    }

    /// Fetch state of a user's slot
    pub async fn state(&self, user_id: Uuid) -> FetchState {
        self.slots
            .lock()
            .await
            .peek(&user_id)
            .map_or(FetchState::Idle, |slot| slot.state)
    }

    /// Drop every slot
    pub async fn clear(&self) {
        self.slots.lock().await.clear();
    }

    /// Counters and slot count
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            users: self.slots.lock().await.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }

    /// Issue a new token and register a shared generation future in the slot
    fn start_generation(
        &self,
        slot: &mut UserSlot,
        user_id: Uuid,
        count: usize,
        today: CalendarDay,
    ) -> (u64, SharedGeneration) {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let source = Arc::clone(&self.source);
        let generation = async move {
            source
                .generate_plan(user_id, count)
                .await
                .map_err(|e| e.to_string())
        }
        .boxed()
        .shared();

        let superseded = slot.in_flight.replace(InFlight {
            token,
            count,
            requested_on: today,
            generation: generation.clone(),
        });
        if let Some(previous) = superseded {
            debug!(
                user_id = %user_id,
                superseded = previous.token,
                token,
                "Superseding in-flight generation"
            );
        }
        slot.token = token;
        slot.state = FetchState::Fetching;
        self.misses.fetch_add(1, Ordering::Relaxed);

        (token, generation)
    }

    /// Await a generation and apply it if its token still owns the slot
    ///
    /// A superseded caller only follows a newer generation of the same
    /// `count`. `owns_generation` marks the caller that started the awaited
    /// generation; only that caller counts it as discarded.
    async fn settle(
        &self,
        user_id: Uuid,
        count: usize,
        mut token: u64,
        mut generation: SharedGeneration,
        mut owns_generation: bool,
    ) -> RecommendationResult {
        loop {
            let outcome = generation.await;

            let mut slots = self.slots.lock().await;
            let slot = slots.get_or_insert_mut(user_id, UserSlot::default);

            if slot.token == token {
                let owns_in_flight = slot
                    .in_flight
                    .as_ref()
                    .is_some_and(|in_flight| in_flight.token == token);
                if let Some(in_flight) = owns_in_flight.then(|| slot.in_flight.take()).flatten() {
                    Self::apply(slot, user_id, &in_flight, outcome);
                }
                return slot.snapshot();
            }

            if owns_generation {
                self.discarded.fetch_add(1, Ordering::Relaxed);
                debug!(
                    user_id = %user_id,
                    token,
                    current = slot.token,
                    "Discarding superseded generation result"
                );
            }

            let newer = slot
                .in_flight
                .as_ref()
                .filter(|in_flight| in_flight.count == count)
                .map(|in_flight| (in_flight.token, in_flight.generation.clone()));
            match newer {
                Some((newer_token, newer_generation)) => {
                    token = newer_token;
                    generation = newer_generation;
                    owns_generation = false;
                }
                None => {
                    return Self::detached_result(slot, self.clock.today(), count, outcome);
                }
            }
        }
    }

    /// Write a settled generation into its slot
    fn apply(slot: &mut UserSlot, user_id: Uuid, in_flight: &InFlight, outcome: GenerationOutcome) {
        match outcome {
            Ok(plan) => {
                slot.entry = Some(RecommendationCacheEntry {
                    user_id,
                    calendar_day: Some(in_flight.requested_on),
                    requested_count: in_flight.count,
                    plan,
                    generated_at: Utc::now(),
                });
                slot.state = FetchState::Ready;
                slot.error = None;
            }
            Err(message) => {
                warn!(
                    user_id = %user_id,
                    token = in_flight.token,
                    error = %message,
                    "Recommendation generation failed, keeping last good plan"
                );
                slot.state = FetchState::Failed;
                slot.error = Some(message);
            }
        }
    }

    /// Answer for a caller whose generation lost the slot with no newer
    /// generation of the same `count` in flight
    ///
    /// The slot's plan is used only when it is ready for today and `count`;
    /// otherwise the caller gets its own outcome, uncached.
    fn detached_result(
        slot: &UserSlot,
        today: CalendarDay,
        count: usize,
        outcome: GenerationOutcome,
    ) -> RecommendationResult {
        if let Some(entry) = slot.fresh_entry(today, count) {
            let mut result = RecommendationResult::from_entry(entry, false);
            result.loading = slot.in_flight.is_some();
            return result;
        }
        match outcome {
            Ok(plan) => RecommendationResult {
                entries: plan.entries,
                focus_theme: plan.focus_theme,
                coach_note: plan.coach_note,
                generated_at: Some(Utc::now()),
                ..RecommendationResult::default()
            },
            Err(message) => {
                let mut result = slot
                    .entry
                    .as_ref()
                    .filter(|entry| entry.requested_count == count)
                    .map(|entry| RecommendationResult::from_entry(entry, false))
                    .unwrap_or_default();
                result.error = Some(message);
                result
            }
        }
    }
}
