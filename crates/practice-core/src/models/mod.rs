// ABOUTME: Plain data models shared by recommendation, caching, and completion components
// ABOUTME: Re-exports the most used types at the module root
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Calendar days, local day windows, and hour-of-day buckets
pub mod calendar;
/// Completion-log source configuration and aggregate reports
pub mod completion;
/// Exercise definitions from the read-only catalog
pub mod exercise;
/// Recommendation entries, scoring wire types, and cache entries
pub mod recommendation;

pub use calendar::{CalendarDay, DayWindow, TimeOfDayBucket};
pub use completion::{
    ActivityRow, CompletionReport, CompletionSourceConfig, CompletionStatusMap, SourceFailure,
    TimestampKind,
};
pub use exercise::ExerciseDefinition;
pub use recommendation::{
    FetchState, GeneratedPlan, Provenance, RecommendationCacheEntry, RecommendationEntry,
    RecommendationResult, ScoredExercise, ScoringRequest, ScoringResponse,
};
