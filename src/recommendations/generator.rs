// ABOUTME: Recommendation generator combining an AI scoring call with deterministic fallback backfill
// ABOUTME: Always returns a bounded, de-duplicated list; scoring failures degrade to the fallback walk
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Recommendation Generator
//!
//! One generation cycle:
//!
//! 1. The AI scoring call and the favorites read are issued concurrently.
//! 2. Scored items are validated against the catalog in rank order; unknown
//!    ids are dropped as data-integrity violations.
//! 3. If fewer than `count` items survive, the fallback pool (favorites,
//!    then the current hour bucket, then the shuffled catalog) backfills
//!    the list, skipping ids already present.
//!
//! AI entries keep their returned rank and always precede fallback entries.

use super::fallback::{candidate_pool, fill_from_pool, TimeBucketPlan};
use super::scorer::RecommendationScorer;
use crate::catalog::ExerciseCatalog;
use crate::clock::{Clock, SystemClock};
use crate::config::environment::RecommendationConfig;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::favorites::FavoritesStore;
use crate::models::{
    GeneratedPlan, RecommendationEntry, ScoredExercise, ScoringRequest, ScoringResponse,
};
use crate::utils::shuffle::UniqueSelection;
use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Anything that can produce a plan for the recommendation cache
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Produce a plan of up to `count` entries
    async fn generate_plan(&self, user_id: Uuid, count: usize) -> AppResult<GeneratedPlan>;
}

/// Builder for [`RecommendationGenerator`]
pub struct RecommendationGeneratorBuilder {
    catalog: Arc<ExerciseCatalog>,
    scorer: Arc<dyn RecommendationScorer>,
    favorites: Arc<FavoritesStore>,
    clock: Arc<dyn Clock>,
    time_buckets: TimeBucketPlan,
    config: RecommendationConfig,
}

impl RecommendationGeneratorBuilder {
    /// Use a specific clock (defaults to the system clock)
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use specific hour-of-day lists (defaults to the built-in lists)
    #[must_use]
    pub fn time_buckets(mut self, time_buckets: TimeBucketPlan) -> Self {
        self.time_buckets = time_buckets;
        self
    }

    /// Use specific generation settings
    #[must_use]
    pub fn config(mut self, config: RecommendationConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the hour-of-day lists and build the generator
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when `strict_fallback_ids` is set and a
    /// bucket lists an id the catalog cannot resolve
    pub fn build(self) -> AppResult<RecommendationGenerator> {
        let unresolved = self.time_buckets.unresolved_ids(&self.catalog);
        if !unresolved.is_empty() {
            if self.config.strict_fallback_ids {
                let listing: Vec<String> = unresolved
                    .iter()
                    .map(|(bucket, id)| format!("{}:{id}", bucket.as_str()))
                    .collect();
                return Err(AppError::config(format!(
                    "time bucket lists reference unknown exercises: {}",
                    listing.join(", ")
                )));
            }
            for (bucket, id) in &unresolved {
                warn!(
                    bucket = bucket.as_str(),
                    exercise_id = %id,
                    "Time bucket id not in catalog; it will be skipped"
                );
            }
        }

        let rng = self
            .config
            .rng_seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);

        info!(
            catalog_size = self.catalog.len(),
            timeout_ms = self.config.scoring_timeout.as_millis() as u64,
            "Recommendation generator ready"
        );

        Ok(RecommendationGenerator {
            catalog: self.catalog,
            scorer: self.scorer,
            favorites: self.favorites,
            clock: self.clock,
            time_buckets: self.time_buckets,
            config: self.config,
            rng: Mutex::new(rng),
        })
    }
}

/// Produces ranked, bounded, de-duplicated daily recommendations
pub struct RecommendationGenerator {
    catalog: Arc<ExerciseCatalog>,
    scorer: Arc<dyn RecommendationScorer>,
    favorites: Arc<FavoritesStore>,
    clock: Arc<dyn Clock>,
    time_buckets: TimeBucketPlan,
    config: RecommendationConfig,
    rng: Mutex<ChaCha8Rng>,
}

impl RecommendationGenerator {
    /// Start building a generator
    #[must_use]
    pub fn builder(
        catalog: Arc<ExerciseCatalog>,
        scorer: Arc<dyn RecommendationScorer>,
        favorites: Arc<FavoritesStore>,
    ) -> RecommendationGeneratorBuilder {
        RecommendationGeneratorBuilder {
            catalog,
            scorer,
            favorites,
            clock: Arc::new(SystemClock),
            time_buckets: TimeBucketPlan::default(),
            config: RecommendationConfig::default(),
        }
    }

    /// Generate `count` recommendations for a user
    ///
    /// The result has exactly `count` entries unless the catalog holds fewer
    /// distinct exercises. Never fails.
    pub async fn generate(&self, user_id: Uuid, count: usize) -> Vec<RecommendationEntry> {
        self.generate_with_context(user_id, count).await.entries
    }

    /// Generate recommendations along with the scorer's theme and note
    pub async fn generate_with_context(&self, user_id: Uuid, count: usize) -> GeneratedPlan {
        if count == 0 {
            return GeneratedPlan::default();
        }

        let request = ScoringRequest {
            user_id,
            requested_count: count,
        };
        let (scored, favorites) = tokio::join!(
            self.score(&request),
            self.favorites.get_favorite_ids(user_id)
        );

        let mut selection = UniqueSelection::new(count);
        let (focus_theme, coach_note) = match scored {
            Ok(response) => {
                let accepted = self.accept_scored(user_id, response.recommendations, &mut selection);
                debug!(user_id = %user_id, accepted, count, "Accepted scored recommendations");
                (response.focus_theme, response.coach_note)
            }
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    error = %e,
                    "Scoring unavailable, using fallback recommendations"
                );
                (None, None)
            }
        };

        if !selection.is_full() {
            let bucket = self.clock.time_bucket();
            let pool = {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                candidate_pool(
                    &favorites,
                    self.time_buckets.ids_for(bucket),
                    &self.catalog,
                    &mut *rng,
                )
            };
            let added = fill_from_pool(&pool, &self.catalog, &mut selection);
            debug!(
                user_id = %user_id,
                bucket = bucket.as_str(),
                favorites = favorites.len(),
                added,
                "Backfilled from fallback pool"
            );
        }

        GeneratedPlan {
            entries: selection.into_items(),
            focus_theme,
            coach_note,
        }
    }

    /// Run the scoring call under the configured timeout
    async fn score(&self, request: &ScoringRequest) -> AppResult<ScoringResponse> {
        let timeout = self.config.scoring_timeout;
        let response = tokio::time::timeout(timeout, self.scorer.score(request))
            .await
            .map_err(|_| {
                AppError::scoring_unavailable(format!(
                    "scoring timed out after {} ms",
                    timeout.as_millis()
                ))
            })??;

        if !response.success {
            return Err(AppError::scoring_unavailable(
                "scorer reported an unsuccessful response",
            ));
        }
        Ok(response)
    }

    /// Validate scored items in rank order and add them to the selection
    fn accept_scored(
        &self,
        user_id: Uuid,
        items: Vec<ScoredExercise>,
        selection: &mut UniqueSelection<RecommendationEntry>,
    ) -> usize {
        let mut accepted = 0;
        for item in items {
            if selection.is_full() {
                break;
            }
            let Some(exercise) = self.catalog.get(&item.exercise_id) else {
                warn!(
                    user_id = %user_id,
                    exercise_id = %item.exercise_id,
                    code = ?ErrorCode::CatalogMismatch,
                    "Dropping scored exercise missing from catalog"
                );
                continue;
            };
            let id = item.exercise_id.clone();
            if selection.push(&id, RecommendationEntry::from_scored(exercise.clone(), item)) {
                accepted += 1;
            } else {
                debug!(user_id = %user_id, exercise_id = %id, "Dropping repeated scored exercise");
            }
        }
        accepted
    }
}

#[async_trait]
impl RecommendationSource for RecommendationGenerator {
    async fn generate_plan(&self, user_id: Uuid, count: usize) -> AppResult<GeneratedPlan> {
        Ok(self.generate_with_context(user_id, count).await)
    }
}
