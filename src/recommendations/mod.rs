// ABOUTME: Daily recommendation pipeline: AI scoring, deterministic fallback, and per-day caching
// ABOUTME: Exposes the generator, the cache, and the scorer seam
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Per-user, per-day memoization with request coalescing
pub mod cache;
/// Deterministic fallback candidate pool and hour-of-day lists
pub mod fallback;
/// Generator combining AI scoring with fallback backfill
pub mod generator;
/// AI scoring seam and its HTTP implementation
pub mod scorer;

pub use cache::{CacheStats, RecommendationCache};
pub use fallback::TimeBucketPlan;
pub use generator::{RecommendationGenerator, RecommendationGeneratorBuilder, RecommendationSource};
pub use scorer::{DisabledScorer, HttpRecommendationScorer, RecommendationScorer};
