// ABOUTME: SQLite implementation of the favorites repository
// ABOUTME: One row per (user, exercise) pair, upserted on every toggle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::FavoritesRepository;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Favorites stored in the `exercise_favorites` table
#[derive(Clone)]
pub struct SqliteFavoritesRepository {
    pool: SqlitePool,
}

impl SqliteFavoritesRepository {
    /// Create a new repository over a pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the favorites table if missing
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercise_favorites (
                user_id TEXT NOT NULL,
                exercise_id TEXT NOT NULL,
                is_favorite INTEGER NOT NULL DEFAULT 1,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, exercise_id)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create favorites table: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl FavoritesRepository for SqliteFavoritesRepository {
    async fn list_favorites(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        let rows = sqlx::query(
            r"
            SELECT exercise_id FROM exercise_favorites
            WHERE user_id = $1 AND is_favorite = 1
            ORDER BY updated_at ASC, exercise_id ASC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list favorites: {e}")))?;

        Ok(rows.iter().map(|row| row.get("exercise_id")).collect())
    }

    async fn set_favorite(
        &self,
        user_id: Uuid,
        exercise_id: &str,
        is_favorite: bool,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO exercise_favorites (user_id, exercise_id, is_favorite, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, exercise_id)
            DO UPDATE SET is_favorite = excluded.is_favorite, updated_at = excluded.updated_at
            ",
        )
        .bind(user_id.to_string())
        .bind(exercise_id)
        .bind(is_favorite)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update favorite: {e}")))?;

        Ok(())
    }
}
