// ABOUTME: Dependency injection context wiring catalog, favorites, recommendations, and completion
// ABOUTME: Opens the SQLite pool, runs table setup, and picks the scorer from configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::catalog::ExerciseCatalog;
use crate::clock::{Clock, SystemClock};
use crate::completion::sqlite::SqliteActivityLog;
use crate::completion::{ActivityLogSource, CompletionAggregator};
use crate::config::environment::PracticeConfig;
use crate::constants::scoring::MAX_RECOMMENDATION_COUNT;
use crate::errors::{AppError, AppResult};
use crate::favorites::sqlite::SqliteFavoritesRepository;
use crate::favorites::{FavoritesRepository, FavoritesStore};
use crate::models::completion::default_completion_sources;
use crate::models::{CompletionReport, RecommendationResult};
use crate::recommendations::{
    DisabledScorer, HttpRecommendationScorer, RecommendationCache, RecommendationGenerator,
    RecommendationScorer, RecommendationSource,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Fully wired daily practice services
///
/// Cloning is cheap; every component sits behind an `Arc`.
#[derive(Clone)]
pub struct PracticeContext {
    config: PracticeConfig,
    catalog: Arc<ExerciseCatalog>,
    favorites: Arc<FavoritesStore>,
    generator: Arc<RecommendationGenerator>,
    cache: Arc<RecommendationCache>,
    completion: Arc<CompletionAggregator>,
}

impl PracticeContext {
    /// Open storage and wire every component from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded, the database cannot
    /// be opened, or the generator rejects its configuration
    pub async fn open(config: PracticeConfig) -> AppResult<Self> {
        let catalog = match &config.storage.catalog_path {
            Some(path) => ExerciseCatalog::load_from_path(path)?,
            None => ExerciseCatalog::builtin()?,
        };

        let pool = connect(&config.storage.database_url).await?;

        let favorites = SqliteFavoritesRepository::new(pool.clone());
        favorites.migrate().await?;

        let activity_log = SqliteActivityLog::new(pool);
        activity_log.migrate(&default_completion_sources()).await?;

        let scorer: Arc<dyn RecommendationScorer> =
            match &config.recommendations.scoring_endpoint {
                Some(endpoint) => Arc::new(HttpRecommendationScorer::new(
                    endpoint.clone(),
                    config.recommendations.scoring_api_key.clone(),
                    config.recommendations.scoring_timeout,
                )?),
                None => Arc::new(DisabledScorer),
            };

        Self::assemble(
            config,
            catalog,
            Arc::new(favorites),
            Arc::new(activity_log),
            scorer,
            Arc::new(SystemClock),
        )
    }

    /// Wire components over explicit adapters
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the generator rejects its configuration
    pub fn assemble(
        config: PracticeConfig,
        catalog: ExerciseCatalog,
        favorites: Arc<dyn FavoritesRepository>,
        activity_log: Arc<dyn ActivityLogSource>,
        scorer: Arc<dyn RecommendationScorer>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let catalog = Arc::new(catalog);
        let favorites = Arc::new(FavoritesStore::new(favorites));

        let generator = Arc::new(
            RecommendationGenerator::builder(Arc::clone(&catalog), scorer, Arc::clone(&favorites))
                .clock(Arc::clone(&clock))
                .config(config.recommendations.clone())
                .build()?,
        );
        let cache = Arc::new(RecommendationCache::new(
            Arc::clone(&generator) as Arc<dyn RecommendationSource>,
            Arc::clone(&clock),
            &config.cache,
        ));
        let completion = Arc::new(CompletionAggregator::with_sources(
            activity_log,
            default_completion_sources(),
            clock,
        ));

        info!(
            environment = %config.environment,
            exercises = catalog.len(),
            "Practice context ready"
        );

        Ok(Self {
            config,
            catalog,
            favorites,
            generator,
            cache,
            completion,
        })
    }

    /// Today's recommendations, served from the per-day cache when possible
    ///
    /// `count` defaults to the configured value and is capped at
    /// [`MAX_RECOMMENDATION_COUNT`].
    pub async fn daily_recommendations(
        &self,
        user_id: Uuid,
        count: Option<usize>,
        force_refresh: bool,
    ) -> RecommendationResult {
        let count = count
            .unwrap_or(self.config.recommendations.default_count)
            .min(MAX_RECOMMENDATION_COUNT);
        self.cache
            .get_or_generate(user_id, count, force_refresh)
            .await
    }

    /// Flip the favorite flag of a catalog exercise
    ///
    /// # Errors
    ///
    /// Returns `CatalogMismatch` for unknown ids and `PersistenceConflict`
    /// if the remote write fails
    pub async fn toggle_favorite(&self, user_id: Uuid, exercise_id: &str) -> AppResult<bool> {
        if !self.catalog.contains(exercise_id) {
            return Err(AppError::catalog_mismatch(exercise_id));
        }
        let current = self
            .favorites
            .get_favorite_ids(user_id)
            .await
            .iter()
            .any(|id| id == exercise_id);
        self.favorites.toggle(user_id, exercise_id, current).await
    }

    /// Completed-today flags for the given categories
    pub async fn completion_status<S: AsRef<str> + Sync>(
        &self,
        user_id: Uuid,
        ids: &[S],
    ) -> CompletionReport {
        self.completion.get_completion_status(user_id, ids).await
    }

    /// Loaded configuration
    #[must_use]
    pub const fn config(&self) -> &PracticeConfig {
        &self.config
    }

    /// Exercise catalog
    #[must_use]
    pub const fn catalog(&self) -> &Arc<ExerciseCatalog> {
        &self.catalog
    }

    /// Favorites store
    #[must_use]
    pub const fn favorites(&self) -> &Arc<FavoritesStore> {
        &self.favorites
    }

    /// Uncached recommendation generator
    #[must_use]
    pub const fn generator(&self) -> &Arc<RecommendationGenerator> {
        &self.generator
    }

    /// Per-day recommendation cache
    #[must_use]
    pub const fn cache(&self) -> &Arc<RecommendationCache> {
        &self.cache
    }

    /// Completion aggregator
    #[must_use]
    pub const fn completion(&self) -> &Arc<CompletionAggregator> {
        &self.completion
    }
}

async fn connect(database_url: &str) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::config(format!("invalid DATABASE_URL '{database_url}': {e}")))?
        .create_if_missing(true);

    // Each in-memory connection is its own database
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| AppError::database(format!("Failed to open {database_url}: {e}")))
}
