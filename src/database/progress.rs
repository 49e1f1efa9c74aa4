// ABOUTME: Progress snapshots: body metrics logged by the user plus a trailing workout rollup
// ABOUTME: Aggregates closed sessions at write time and serves newest-first progress history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

use athletix_core::constants::{defaults, limits, progress};
use athletix_core::errors::{AppError, AppResult};
use athletix_core::models::{NewProgressRecord, ProgressRecord};
use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::mappers::{column, format_timestamp, timestamp_column, uuid_column};
use super::transactions::{retry_transaction, TransactionGuard};
use crate::intelligence::overall_form_score;

const PROGRESS_COLUMNS: &str = "id, user_id, recorded_at, weight_kg, body_fat_percentage, \
    workouts_completed, total_workout_minutes, total_calories_burned, avg_form_score, notes";

/// Database manager for progress snapshots
pub struct ProgressManager {
    pool: SqlitePool,
    max_attempts: u32,
}

impl ProgressManager {
    /// Create a new progress manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            max_attempts: defaults::TRANSACTION_MAX_RETRIES,
        }
    }

    /// Override the retry budget for snapshot writes
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Log a progress snapshot taken now
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` for invalid body metrics or a database error
    pub async fn create_progress_record(
        &self,
        user_id: Uuid,
        input: &NewProgressRecord,
    ) -> AppResult<ProgressRecord> {
        self.create_progress_record_at(user_id, input, Utc::now())
            .await
    }

    /// Log a progress snapshot at an explicit time
    ///
    /// Workout stats cover sessions of this user closed within the seven days up to
    /// and including `now`. Active sessions are not counted.
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` for invalid body metrics or a database error
    pub async fn create_progress_record_at(
        &self,
        user_id: Uuid,
        input: &NewProgressRecord,
        now: DateTime<Utc>,
    ) -> AppResult<ProgressRecord> {
        input.validate()?;

        let record = retry_transaction(
            || self.create_once(user_id, input, now),
            self.max_attempts,
        )
        .await?;

        info!(
            user_id = %user_id,
            progress_id = %record.id,
            workouts_completed = record.workouts_completed,
            total_workout_minutes = record.total_workout_minutes,
            avg_form_score = ?record.avg_form_score,
            "Progress snapshot recorded"
        );
        Ok(record)
    }

    async fn create_once(
        &self,
        user_id: Uuid,
        input: &NewProgressRecord,
        now: DateTime<Utc>,
    ) -> AppResult<ProgressRecord> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::new(tx);

        let window_start = now - Duration::days(progress::STATS_WINDOW_DAYS);

        let totals = sqlx::query(
            r"
            SELECT COUNT(*) AS workouts,
                   COALESCE(SUM(duration_minutes), 0) AS minutes,
                   COALESCE(SUM(total_calories_burned), 0.0) AS calories
            FROM workout_sessions
            WHERE user_id = $1 AND ended_at IS NOT NULL AND ended_at > $2 AND ended_at <= $3
            ",
        )
        .bind(user_id.to_string())
        .bind(format_timestamp(window_start))
        .bind(format_timestamp(now))
        .fetch_one(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to aggregate workout stats: {e}")))?;

        let session_scores: Vec<Option<f64>> = sqlx::query_scalar(
            r"
            SELECT overall_form_score
            FROM workout_sessions
            WHERE user_id = $1 AND ended_at IS NOT NULL AND ended_at > $2 AND ended_at <= $3
            ",
        )
        .bind(user_id.to_string())
        .bind(format_timestamp(window_start))
        .bind(format_timestamp(now))
        .fetch_all(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to read session form scores: {e}")))?;

        let record = ProgressRecord {
            id: Uuid::new_v4(),
            user_id,
            recorded_at: now,
            weight_kg: input.weight_kg,
            body_fat_percentage: input.body_fat_percentage,
            workouts_completed: column(&totals, "workouts")?,
            total_workout_minutes: column(&totals, "minutes")?,
            total_calories_burned: column(&totals, "calories")?,
            avg_form_score: overall_form_score(session_scores),
            notes: input.notes.clone(),
        };

        sqlx::query(
            r"
            INSERT INTO progress_records (
                id, user_id, recorded_at, weight_kg, body_fat_percentage, workouts_completed,
                total_workout_minutes, total_calories_burned, avg_form_score, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(format_timestamp(record.recorded_at))
        .bind(record.weight_kg)
        .bind(record.body_fat_percentage)
        .bind(record.workouts_completed)
        .bind(record.total_workout_minutes)
        .bind(record.total_calories_burned)
        .bind(record.avg_form_score)
        .bind(record.notes.as_deref())
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to create progress record: {e}")))?;

        guard.commit().await?;
        Ok(record)
    }

    /// Progress snapshots for a user, newest first
    ///
    /// `limit` defaults to 30 and is capped at 100.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn progress_history(
        &self,
        user_id: Uuid,
        limit: Option<u32>,
    ) -> AppResult<Vec<ProgressRecord>> {
        let limit = limit
            .unwrap_or(limits::DEFAULT_PROGRESS_HISTORY)
            .clamp(1, limits::MAX_PROGRESS_HISTORY);

        let rows = sqlx::query(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM progress_records WHERE user_id = $1 \
             ORDER BY recorded_at DESC, rowid DESC LIMIT $2"
        ))
        .bind(user_id.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get progress history: {e}")))?;

        rows.iter().map(row_to_progress).collect()
    }

    /// Most recent progress snapshot, if any was logged
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn latest_progress(&self, user_id: Uuid) -> AppResult<Option<ProgressRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM progress_records WHERE user_id = $1 \
             ORDER BY recorded_at DESC, rowid DESC LIMIT 1"
        ))
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get latest progress: {e}")))?;

        row.as_ref().map(row_to_progress).transpose()
    }
}

fn row_to_progress(row: &SqliteRow) -> AppResult<ProgressRecord> {
    Ok(ProgressRecord {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        recorded_at: timestamp_column(row, "recorded_at")?,
        weight_kg: column(row, "weight_kg")?,
        body_fat_percentage: column(row, "body_fat_percentage")?,
        workouts_completed: column(row, "workouts_completed")?,
        total_workout_minutes: column(row, "total_workout_minutes")?,
        total_calories_burned: column(row, "total_calories_burned")?,
        avg_form_score: column(row, "avg_form_score")?,
        notes: column(row, "notes")?,
    })
}
