// ABOUTME: Recommendation entries, AI scoring wire types, and per-user cache entries
// ABOUTME: Shared between the generator, the cache, and calling surfaces
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::calendar::CalendarDay;
use super::exercise::ExerciseDefinition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a recommendation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Returned by the AI scorer
    Ai,
    /// Produced by the deterministic fallback walk
    Fallback,
}

/// One recommended exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    /// The resolved catalog definition
    pub exercise: ExerciseDefinition,
    /// Origin of the entry
    pub provenance: Provenance,
    /// Scorer priority, present only for AI entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<f64>,
    /// Scorer reasoning, present only for AI entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Personalization note from the scorer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalization_note: Option<String>,
    /// Expected benefit from the scorer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_benefit: Option<String>,
}

impl RecommendationEntry {
    /// Entry backed by an AI-scored item
    #[must_use]
    pub fn from_scored(exercise: ExerciseDefinition, scored: ScoredExercise) -> Self {
        Self {
            exercise,
            provenance: Provenance::Ai,
            priority_score: Some(scored.priority_score),
            reasoning: Some(scored.reasoning),
            personalization_note: scored.personalization_note,
            expected_benefit: scored.expected_benefit,
        }
    }

    /// Entry produced by the fallback walk
    #[must_use]
    pub const fn fallback(exercise: ExerciseDefinition) -> Self {
        Self {
            exercise,
            provenance: Provenance::Fallback,
            priority_score: None,
            reasoning: None,
            personalization_note: None,
            expected_benefit: None,
        }
    }

    /// Id of the recommended exercise
    #[must_use]
    pub fn exercise_id(&self) -> &str {
        &self.exercise.id
    }
}

/// Output of one generation cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPlan {
    /// Ordered, de-duplicated entries
    pub entries: Vec<RecommendationEntry>,
    /// Theme of the day suggested by the scorer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_theme: Option<String>,
    /// Short coaching note from the scorer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coach_note: Option<String>,
}

impl GeneratedPlan {
    /// Exercise ids in entry order
    #[must_use]
    pub fn exercise_ids(&self) -> Vec<&str> {
        self.entries.iter().map(RecommendationEntry::exercise_id).collect()
    }
}

/// Request sent to the AI scorer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRequest {
    /// User being scored
    pub user_id: Uuid,
    /// Number of items wanted
    pub requested_count: usize,
}

/// One item returned by the AI scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredExercise {
    /// Catalog id, not yet validated
    pub exercise_id: String,
    /// Relative priority assigned by the scorer
    #[serde(default)]
    pub priority_score: f64,
    /// Natural-language reasoning
    #[serde(default)]
    pub reasoning: String,
    /// Personalization note
    #[serde(default)]
    pub personalization_note: Option<String>,
    /// Expected benefit
    #[serde(default)]
    pub expected_benefit: Option<String>,
}

/// Response of the AI scorer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResponse {
    /// Whether the scorer produced a usable answer
    pub success: bool,
    /// Ranked items, best first
    #[serde(default)]
    pub recommendations: Vec<ScoredExercise>,
    /// Theme of the day
    #[serde(default)]
    pub focus_theme: Option<String>,
    /// Coaching note
    #[serde(default)]
    pub coach_note: Option<String>,
}

/// Per-user fetch state of the recommendation cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchState {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A generation is in flight
    Fetching,
    /// Last generation succeeded
    Ready,
    /// Last generation failed
    Failed,
}

/// Memoized plan for one user and one local calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationCacheEntry {
    /// Owner
    pub user_id: Uuid,
    /// Day the entry is valid for; `None` once manually invalidated
    pub calendar_day: Option<CalendarDay>,
    /// Number of entries the caller asked for
    pub requested_count: usize,
    /// The generated plan
    pub plan: GeneratedPlan,
    /// When the plan was generated
    pub generated_at: DateTime<Utc>,
}

impl RecommendationCacheEntry {
    /// Whether the entry answers a request for `count` items on `today`
    #[must_use]
    pub fn is_valid_for(&self, today: CalendarDay, count: usize) -> bool {
        self.calendar_day == Some(today) && self.requested_count == count
    }
}

/// What the cache hands back to calling surfaces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// Recommended entries (possibly the last good plan after a failure)
    pub entries: Vec<RecommendationEntry>,
    /// Theme of the day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_theme: Option<String>,
    /// Coaching note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coach_note: Option<String>,
    /// Whether a generation is still running for this user
    pub loading: bool,
    /// Error message of the last failed generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the answer came straight from the cache
    pub served_from_cache: bool,
    /// When the returned plan was generated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl RecommendationResult {
    /// Result wrapping a cache entry
    #[must_use]
    pub fn from_entry(entry: &RecommendationCacheEntry, served_from_cache: bool) -> Self {
        Self {
            entries: entry.plan.entries.clone(),
            focus_theme: entry.plan.focus_theme.clone(),
            coach_note: entry.plan.coach_note.clone(),
            loading: false,
            error: None,
            served_from_cache,
            generated_at: Some(entry.generated_at),
        }
    }
}
