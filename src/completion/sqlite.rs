// ABOUTME: SQLite activity log queried through data-driven source configs
// ABOUTME: Builds one parameterized query per source from validated table and column names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ActivityLogSource;
use crate::errors::{AppError, AppResult};
use crate::models::{ActivityRow, CompletionSourceConfig, DayWindow, TimestampKind};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Activity log backed by SQLite tables named in the source configs
#[derive(Clone)]
pub struct SqliteActivityLog {
    pool: SqlitePool,
}

impl SqliteActivityLog {
    /// Create a new log reader over a pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the tables of the given sources if missing
    ///
    /// Each table gets an `id`, the user field, the timestamp field, and the
    /// flag field when one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is not a plain identifier or the DDL fails
    pub async fn migrate(&self, sources: &[CompletionSourceConfig]) -> AppResult<()> {
        for source in sources {
            let flag_column = match &source.completed_flag_field {
                Some(flag) => format!(", {} INTEGER NOT NULL DEFAULT 0", identifier(flag)?),
                None => String::new(),
            };
            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    {user} TEXT NOT NULL,
                    {ts} TEXT NOT NULL{flag_column}
                )",
                table = identifier(&source.table_name)?,
                user = identifier(&source.user_id_field)?,
                ts = identifier(&source.activity_timestamp_field)?,
            );
            sqlx::query(&ddl).execute(&self.pool).await.map_err(|e| {
                AppError::database(format!(
                    "Failed to create table for source '{}': {e}",
                    source.source_id
                ))
            })?;
        }
        Ok(())
    }
}

/// Reject anything that is not a plain SQL identifier
fn identifier(name: &str) -> AppResult<&str> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(name)
    } else {
        Err(AppError::config(format!("'{name}' is not a valid column or table name")))
    }
}

fn select_for(source: &CompletionSourceConfig) -> AppResult<String> {
    let flag = match &source.completed_flag_field {
        Some(field) => identifier(field)?,
        None => "NULL",
    };
    let table = identifier(&source.table_name)?;
    let user = identifier(&source.user_id_field)?;
    let ts = identifier(&source.activity_timestamp_field)?;

    Ok(match source.timestamp_kind {
        TimestampKind::Instant => format!(
            "SELECT {flag} AS completed FROM {table} \
             WHERE {user} = $1 AND julianday({ts}) >= julianday($2) AND julianday({ts}) < julianday($3)"
        ),
        TimestampKind::CalendarDate => {
            format!("SELECT {flag} AS completed FROM {table} WHERE {user} = $1 AND {ts} = $2")
        }
    })
}

#[async_trait]
impl ActivityLogSource for SqliteActivityLog {
    async fn fetch_rows(
        &self,
        config: &CompletionSourceConfig,
        user_id: Uuid,
        window: &DayWindow,
    ) -> AppResult<Vec<ActivityRow>> {
        let sql = select_for(config)?;
        let query = sqlx::query(&sql).bind(user_id.to_string());
        let query = match config.timestamp_kind {
            TimestampKind::Instant => query
                .bind(
                    window
                        .start
                        .with_timezone(&Utc)
                        .to_rfc3339_opts(SecondsFormat::Millis, true),
                )
                .bind(
                    window
                        .end
                        .with_timezone(&Utc)
                        .to_rfc3339_opts(SecondsFormat::Millis, true),
                ),
            TimestampKind::CalendarDate => query.bind(window.day.to_string()),
        };

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::source_query(&config.source_id, e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get::<Option<bool>, _>("completed")
                    .map(|completed| ActivityRow { completed })
                    .map_err(|e| AppError::source_query(&config.source_id, e.to_string()))
            })
            .collect()
    }
}
