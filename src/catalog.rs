// ABOUTME: Read-only exercise catalog loaded once at process start
// ABOUTME: Answers id lookups for the generator and validates externally supplied ids
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use crate::models::ExerciseDefinition;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

const BUILTIN_CATALOG: &str = include_str!("../demos/catalog.json");

/// Immutable list of exercise definitions indexed by id
///
/// Catalog order is preserved; lookups are O(1).
#[derive(Debug, Clone, Default)]
pub struct ExerciseCatalog {
    exercises: Vec<ExerciseDefinition>,
    index: HashMap<String, usize>,
}

impl ExerciseCatalog {
    /// Build a catalog from definitions
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if an id is empty or appears twice
    pub fn new(exercises: Vec<ExerciseDefinition>) -> AppResult<Self> {
        let mut index = HashMap::with_capacity(exercises.len());
        for (position, exercise) in exercises.iter().enumerate() {
            if exercise.id.trim().is_empty() {
                return Err(AppError::config(format!(
                    "catalog entry {position} has an empty id"
                )));
            }
            if index.insert(exercise.id.clone(), position).is_some() {
                return Err(AppError::config(format!(
                    "duplicate exercise id '{}' in catalog",
                    exercise.id
                )));
            }
        }
        Ok(Self { exercises, index })
    }

    /// Parse a JSON array of definitions
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` for malformed JSON and `ConfigInvalid` for bad ids
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        let exercises: Vec<ExerciseDefinition> = serde_json::from_str(json)?;
        Self::new(exercises)
    }

    /// Catalog bundled with the crate
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled JSON is malformed
    pub fn builtin() -> AppResult<Self> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Load a JSON catalog file
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the file cannot be read, otherwise as [`Self::from_json_str`]
    pub fn load_from_path(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read catalog {}: {e}", path.display()))
        })?;
        let catalog = Self::from_json_str(&json)?;
        info!(
            path = %path.display(),
            exercises = catalog.len(),
            "Loaded exercise catalog"
        );
        Ok(catalog)
    }

    /// Look up a definition by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ExerciseDefinition> {
        self.index.get(id).map(|&position| &self.exercises[position])
    }

    /// Whether the id exists
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ids in catalog order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.exercises.iter().map(|exercise| exercise.id.as_str())
    }

    /// Definitions in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &ExerciseDefinition> {
        self.exercises.iter()
    }

    /// Number of definitions
    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}
