// ABOUTME: Unified error handling for the daily practice subsystem
// ABOUTME: Error codes mirror the degradation taxonomy used by generation, caching, and completion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling
//!
//! Every fallible operation in the subsystem returns [`AppResult`]. Most codes
//! never cross a public boundary: scoring failures trigger the deterministic
//! fallback, catalog mismatches are dropped, and source query failures are
//! folded into a completion report. Only [`ErrorCode::PersistenceConflict`]
//! is meant to reach the end user.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Degradation taxonomy (1000-1999)
    /// AI scoring call failed, timed out, or reported `success: false`
    ScoringUnavailable = 1000,
    /// AI scoring returned an exercise id absent from the catalog
    CatalogMismatch = 1001,
    /// One completion-log source failed to answer
    SourceQueryFailure = 1002,
    /// A favorite toggle could not be persisted remotely
    PersistenceConflict = 1003,

    // Validation (3000-3999)
    /// Caller supplied invalid input
    InvalidInput = 3000,

    // Configuration (6000-6999)
    /// Configuration is present but invalid
    ConfigInvalid = 6000,

    // Internal (9000-9999)
    /// Unexpected internal failure
    InternalError = 9000,
    /// Backing store operation failed
    DatabaseError = 9001,
    /// Data serialization or deserialization failed
    SerializationError = 9002,
    /// An external service returned an error
    ExternalServiceError = 9003,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ScoringUnavailable => "Personalized scoring is currently unavailable",
            Self::CatalogMismatch => "Recommendation referenced an unknown exercise",
            Self::SourceQueryFailure => "An activity log could not be queried",
            Self::PersistenceConflict => "Your change could not be saved",
            Self::InvalidInput => "The provided input is invalid",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
            Self::ExternalServiceError => "An external service encountered an error",
        }
    }

    /// Whether this error is surfaced to the end user
    ///
    /// Read and derive paths degrade silently; only user-initiated writes
    /// report their failure.
    #[must_use]
    pub const fn is_user_visible(&self) -> bool {
        matches!(self, Self::PersistenceConflict | Self::InvalidInput)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Unified error type for the subsystem
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Scoring call failed or timed out
    pub fn scoring_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ScoringUnavailable, message)
    }

    /// Scoring returned an id the catalog does not know
    pub fn catalog_mismatch(exercise_id: &str) -> Self {
        Self::new(
            ErrorCode::CatalogMismatch,
            format!("exercise '{exercise_id}' is not in the catalog"),
        )
    }

    /// A completion source query failed
    pub fn source_query(source_id: &str, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::SourceQueryFailure,
            format!("{source_id}: {}", message.into()),
        )
    }

    /// A favorite write was rejected or could not be confirmed
    pub fn persistence_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PersistenceConflict, message)
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string()).with_source(error)
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        Self::database(error.to_string()).with_source(error)
    }
}

#[cfg(feature = "scoring-errors")]
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "scoring request timed out".to_owned()
        } else {
            error.to_string()
        };
        Self::scoring_unavailable(message).with_source(error)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
