// ABOUTME: Environment configuration for the daily practice services
// ABOUTME: Parses scoring, cache, storage, and deployment settings from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration

use crate::constants::cache::DEFAULT_CACHE_MAX_USERS;
use crate::constants::scoring::{DEFAULT_RECOMMENDATION_COUNT, DEFAULT_SCORING_TIMEOUT_MS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Default database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./daily_practice.db";

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Recommendation generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Entries requested when the caller does not say
    pub default_count: usize,
    /// Upper bound on the AI scoring call
    pub scoring_timeout: Duration,
    /// Fail startup when a time bucket lists an id missing from the catalog
    pub strict_fallback_ids: bool,
    /// Scoring endpoint; scoring is disabled when unset
    pub scoring_endpoint: Option<String>,
    /// Bearer token for the scoring endpoint
    #[serde(skip_serializing)]
    pub scoring_api_key: Option<String>,
    /// Fixed seed for the fallback shuffle (reproducible runs)
    pub rng_seed: Option<u64>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_RECOMMENDATION_COUNT,
            scoring_timeout: Duration::from_millis(DEFAULT_SCORING_TIMEOUT_MS),
            strict_fallback_ids: false,
            scoring_endpoint: None,
            scoring_api_key: None,
            rng_seed: None,
        }
    }
}

impl RecommendationConfig {
    /// Load from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable does not parse
    pub fn from_env() -> Result<Self> {
        let timeout_ms: u64 = env_var_or(
            "PRACTICE_SCORING_TIMEOUT_MS",
            &DEFAULT_SCORING_TIMEOUT_MS.to_string(),
        )
        .parse()
        .context("Invalid PRACTICE_SCORING_TIMEOUT_MS value")?;

        let rng_seed = env::var("PRACTICE_RNG_SEED")
            .ok()
            .map(|seed| seed.parse::<u64>())
            .transpose()
            .context("Invalid PRACTICE_RNG_SEED value")?;

        Ok(Self {
            default_count: env_var_or(
                "PRACTICE_DEFAULT_COUNT",
                &DEFAULT_RECOMMENDATION_COUNT.to_string(),
            )
            .parse()
            .context("Invalid PRACTICE_DEFAULT_COUNT value")?,
            scoring_timeout: Duration::from_millis(timeout_ms),
            strict_fallback_ids: env_var_or("PRACTICE_STRICT_FALLBACK_IDS", "false")
                .parse()
                .context("Invalid PRACTICE_STRICT_FALLBACK_IDS value")?,
            scoring_endpoint: non_empty_var("PRACTICE_SCORING_URL"),
            scoring_api_key: non_empty_var("PRACTICE_SCORING_API_KEY"),
            rng_seed,
        })
    }
}

/// Recommendation cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Users kept before the least recently used slot is evicted
    pub max_users: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_users: DEFAULT_CACHE_MAX_USERS,
        }
    }
}

impl CacheConfig {
    /// Load from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `PRACTICE_CACHE_MAX_USERS` does not parse
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            max_users: env_var_or(
                "PRACTICE_CACHE_MAX_USERS",
                &DEFAULT_CACHE_MAX_USERS.to_string(),
            )
            .parse()
            .context("Invalid PRACTICE_CACHE_MAX_USERS value")?,
        })
    }
}

/// Storage locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// sqlx connection string for favorites and activity logs
    pub database_url: String,
    /// JSON file holding the exercise catalog
    pub catalog_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            catalog_path: None,
        }
    }
}

impl StorageConfig {
    /// Load from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            database_url: env_var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            catalog_path: non_empty_var("PRACTICE_CATALOG_PATH").map(PathBuf::from),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Recommendation generation
    pub recommendations: RecommendationConfig,
    /// Recommendation cache
    pub cache: CacheConfig,
    /// Storage
    pub storage: StorageConfig,
}

impl PracticeConfig {
    /// Load the whole configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any variable holds a value of the wrong type
    pub fn from_env() -> Result<Self> {
        let config = Self {
            environment: Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development")),
            recommendations: RecommendationConfig::from_env()?,
            cache: CacheConfig::from_env()?,
            storage: StorageConfig::from_env(),
        };
        config.log_summary();
        Ok(config)
    }

    fn log_summary(&self) {
        info!(
            environment = %self.environment,
            default_count = self.recommendations.default_count,
            scoring_timeout_ms = u64::try_from(self.recommendations.scoring_timeout.as_millis())
                .unwrap_or(u64::MAX),
            cache_max_users = self.cache.max_users,
            "Practice configuration loaded"
        );
        if self.recommendations.scoring_endpoint.is_none() {
            warn!("PRACTICE_SCORING_URL not set, recommendations will use the fallback pool only");
        }
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Environment variable, treating empty strings as unset
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
