// ABOUTME: Exercise definition as supplied by the read-only exercise catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An immutable exercise definition
///
/// Loaded once at process start and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Category label such as "Mindfulness" or "Deep Work"
    pub category: String,
    /// Free-form tags
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Suggested duration, if the exercise is timed
    #[serde(default)]
    pub default_duration_seconds: Option<u32>,
    /// Whether the exercise can be started without setup
    #[serde(default)]
    pub is_quick_start: bool,
}

impl ExerciseDefinition {
    /// Create a definition with no tags, no duration, and quick start off
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            tags: BTreeSet::new(),
            default_duration_seconds: None,
            is_quick_start: false,
        }
    }

    /// Add a tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Set the default duration
    #[must_use]
    pub const fn with_duration_seconds(mut self, seconds: u32) -> Self {
        self.default_duration_seconds = Some(seconds);
        self
    }

    /// Mark as quick start
    #[must_use]
    pub const fn quick_start(mut self) -> Self {
        self.is_quick_start = true;
        self
    }
}
