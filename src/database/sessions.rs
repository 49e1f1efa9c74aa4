// ABOUTME: Session lifecycle storage: start, close with derived duration and score, and history
// ABOUTME: Owns workout_sessions and session_exercises rows including lazy exercise creation and set logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

//! Session lifecycle
//!
//! A session is created Active and becomes Closed when `ended_at` is set. Closing is
//! not idempotent: closing again re-derives `duration_minutes` from the original start
//! and re-computes the session score.

use std::collections::HashSet;

use athletix_core::constants::{defaults, limits, session as session_consts};
use athletix_core::errors::{AppError, AppResult};
use athletix_core::models::{
    SessionDetail, SessionExercise, SessionSummary, StartSession, WorkoutSession,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::mappers::{
    column, format_timestamp, json_column, optional_timestamp_column, optional_uuid_column,
    parse_timestamp, timestamp_column, uuid_column,
};
use super::transactions::{retry_transaction, TransactionGuard};
use crate::intelligence::overall_form_score;

const SESSION_COLUMNS: &str = "id, user_id, plan_id, plan_day_id, started_at, ended_at, \
     duration_minutes, total_calories_burned, overall_form_score, notes, user_rating, fatigue_level";

const EXERCISE_COLUMNS: &str = "se.id, se.session_id, se.exercise_id, se.sets_completed, \
     se.reps_completed, se.weight_used_kg, se.avg_form_score, se.version";

/// Database manager for workout sessions and their exercise records
pub struct SessionManager {
    pool: SqlitePool,
    max_attempts: u32,
}

impl SessionManager {
    /// Create a new session manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            max_attempts: defaults::TRANSACTION_MAX_RETRIES,
        }
    }

    /// Override the retry budget for contended writes
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Start a session now
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn start_session(
        &self,
        user_id: Uuid,
        input: StartSession,
    ) -> AppResult<WorkoutSession> {
        self.start_session_at(user_id, input, Utc::now()).await
    }

    /// Start a session at an explicit time
    ///
    /// Plan references are stored as given. One exercise record is pre-created per
    /// distinct catalog exercise in `input.exercise_ids`.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn start_session_at(
        &self,
        user_id: Uuid,
        input: StartSession,
        now: DateTime<Utc>,
    ) -> AppResult<WorkoutSession> {
        let session_id = Uuid::new_v4();
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::new(tx);

        sqlx::query(
            r"
            INSERT INTO workout_sessions (id, user_id, plan_id, plan_day_id, started_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(session_id.to_string())
        .bind(user_id.to_string())
        .bind(input.plan_id.map(|id| id.to_string()))
        .bind(input.plan_day_id.map(|id| id.to_string()))
        .bind(format_timestamp(now))
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to create workout session: {e}")))?;

        let mut seen = HashSet::new();
        for exercise_id in input.exercise_ids.into_iter().filter(|id| seen.insert(*id)) {
            insert_exercise_if_missing(guard.executor()?, session_id, exercise_id).await?;
        }

        let session = fetch_session(guard.executor()?, session_id, user_id)
            .await?
            .ok_or_else(|| AppError::internal("Created session could not be read back"))?;
        guard.commit().await?;

        info!(
            user_id = %user_id,
            session_id = %session_id,
            pre_created = seen.len(),
            "Workout session started"
        );
        Ok(session)
    }

    /// Close a session now
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the session does not exist for this user,
    /// `ValueOutOfRange` for an invalid summary, or a database error
    pub async fn end_session(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        summary: &SessionSummary,
    ) -> AppResult<WorkoutSession> {
        self.end_session_at(session_id, user_id, summary, Utc::now())
            .await
    }

    /// Close a session at an explicit time
    ///
    /// Sets `ended_at`, derives whole-minute duration, overwrites each summary field
    /// only when supplied with a non-zero/non-empty value, and rolls the exercise scores
    /// up into `overall_form_score`. A stored score is left as is when no exercise has
    /// been scored.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the session does not exist for this user,
    /// `ValueOutOfRange` for an invalid summary, `InvalidInput` if `now` precedes the
    /// session start, or a database error
    pub async fn end_session_at(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        summary: &SessionSummary,
        now: DateTime<Utc>,
    ) -> AppResult<WorkoutSession> {
        summary.validate()?;

        let session = retry_transaction(
            || self.close_once(session_id, user_id, summary, now),
            self.max_attempts,
        )
        .await?;

        info!(
            user_id = %user_id,
            session_id = %session_id,
            duration_minutes = ?session.duration_minutes,
            overall_form_score = ?session.overall_form_score,
            "Workout session closed"
        );
        Ok(session)
    }

    async fn close_once(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        summary: &SessionSummary,
        now: DateTime<Utc>,
    ) -> AppResult<WorkoutSession> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::new(tx);

        // Write first so the transaction holds the write lock for the whole close
        let claimed = sqlx::query(
            "UPDATE workout_sessions SET ended_at = $1 WHERE id = $2 AND user_id = $3",
        )
        .bind(format_timestamp(now))
        .bind(session_id.to_string())
        .bind(user_id.to_string())
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to close workout session: {e}")))?;

        if claimed.rows_affected() == 0 {
            return Err(AppError::not_found("Workout session")
                .with_resource_id(session_id.to_string())
                .with_user_id(user_id));
        }

        let started_at: String = sqlx::query_scalar(
            "SELECT started_at FROM workout_sessions WHERE id = $1",
        )
        .bind(session_id.to_string())
        .fetch_one(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to read session start: {e}")))?;
        let started_at = parse_timestamp(&started_at, "started_at")?;

        let duration_minutes = duration_minutes(started_at, now)?;

        let exercise_scores: Vec<Option<f64>> = sqlx::query_scalar(
            "SELECT avg_form_score FROM session_exercises WHERE session_id = $1",
        )
        .bind(session_id.to_string())
        .fetch_all(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to read exercise scores: {e}")))?;
        let overall = overall_form_score(exercise_scores);

        sqlx::query(
            r"
            UPDATE workout_sessions
            SET duration_minutes = $1,
                overall_form_score = COALESCE($2, overall_form_score),
                total_calories_burned = COALESCE($3, total_calories_burned),
                notes = COALESCE($4, notes),
                user_rating = COALESCE($5, user_rating),
                fatigue_level = COALESCE($6, fatigue_level)
            WHERE id = $7
            ",
        )
        .bind(duration_minutes)
        .bind(overall)
        .bind(summary.supplied_calories())
        .bind(summary.supplied_notes())
        .bind(summary.supplied_user_rating())
        .bind(summary.supplied_fatigue_level())
        .bind(session_id.to_string())
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to update session summary: {e}")))?;

        let session = fetch_session(guard.executor()?, session_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout session"))?;
        guard.commit().await?;
        Ok(session)
    }

    /// Get or create the exercise record for a catalog exercise within a session
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the session does not exist for this user, or a
    /// database error
    pub async fn add_exercise(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        exercise_id: Uuid,
    ) -> AppResult<SessionExercise> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::new(tx);

        if fetch_session(guard.executor()?, session_id, user_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found("Workout session")
                .with_resource_id(session_id.to_string())
                .with_user_id(user_id));
        }

        let created = insert_exercise_if_missing(guard.executor()?, session_id, exercise_id).await?;

        let row = sqlx::query(&format!(
            "SELECT {EXERCISE_COLUMNS} FROM session_exercises se WHERE se.session_id = $1 AND se.exercise_id = $2"
        ))
        .bind(session_id.to_string())
        .bind(exercise_id.to_string())
        .fetch_one(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to read session exercise: {e}")))?;
        let exercise = row_to_session_exercise(&row)?;
        guard.commit().await?;

        debug!(
            session_id = %session_id,
            session_exercise_id = %exercise.id,
            created,
            "Session exercise resolved"
        );
        Ok(exercise)
    }

    /// Append one set to an exercise record
    ///
    /// `weight_kg` of `None` records `0.0` so reps and weights stay parallel.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the exercise record does not belong to a session of
    /// this user, `ValueOutOfRange` for negative reps or weight, or a database error
    pub async fn record_set(
        &self,
        session_exercise_id: Uuid,
        user_id: Uuid,
        reps: i32,
        weight_kg: Option<f64>,
    ) -> AppResult<SessionExercise> {
        if reps < 0 {
            return Err(AppError::out_of_range("reps", reps, ">= 0"));
        }
        let weight = weight_kg.unwrap_or(0.0);
        if weight < 0.0 || !weight.is_finite() {
            return Err(AppError::out_of_range("weight_kg", weight, ">= 0"));
        }

        retry_transaction(
            || self.record_set_once(session_exercise_id, user_id, reps, weight),
            self.max_attempts,
        )
        .await
    }

    async fn record_set_once(
        &self,
        session_exercise_id: Uuid,
        user_id: Uuid,
        reps: i32,
        weight: f64,
    ) -> AppResult<SessionExercise> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::new(tx);

        let mut exercise =
            fetch_owned_exercise(guard.executor()?, session_exercise_id, user_id).await?;
        let expected_version = exercise.version;
        exercise.sets_completed += 1;
        exercise.reps_completed.push(reps);
        exercise.weight_used_kg.push(weight);
        exercise.version += 1;

        let result = sqlx::query(
            r"
            UPDATE session_exercises
            SET sets_completed = $1, reps_completed = $2, weight_used_kg = $3, version = $4
            WHERE id = $5 AND version = $6
            ",
        )
        .bind(exercise.sets_completed)
        .bind(serde_json::to_string(&exercise.reps_completed)?)
        .bind(serde_json::to_string(&exercise.weight_used_kg)?)
        .bind(exercise.version)
        .bind(session_exercise_id.to_string())
        .bind(expected_version)
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to record set: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::concurrency_conflict("Session exercise")
                .with_resource_id(session_exercise_id.to_string()));
        }
        guard.commit().await?;

        debug!(
            session_exercise_id = %session_exercise_id,
            sets_completed = exercise.sets_completed,
            "Set recorded"
        );
        Ok(exercise)
    }

    /// Get a session with its exercise records
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the session does not exist for this user, or a
    /// database error
    pub async fn get_session(&self, session_id: Uuid, user_id: Uuid) -> AppResult<SessionDetail> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;

        let session = fetch_session(&mut *conn, session_id, user_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Workout session")
                    .with_resource_id(session_id.to_string())
                    .with_user_id(user_id)
            })?;

        let rows = sqlx::query(&format!(
            "SELECT {EXERCISE_COLUMNS} FROM session_exercises se WHERE se.session_id = $1 ORDER BY se.rowid ASC"
        ))
        .bind(session_id.to_string())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to list session exercises: {e}")))?;
        let exercises = rows
            .iter()
            .map(row_to_session_exercise)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(SessionDetail { session, exercises })
    }

    /// List a user's sessions, newest first
    ///
    /// `limit` defaults to 20 and is capped at 100.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_user_sessions(
        &self,
        user_id: Uuid,
        skip: u32,
        limit: Option<u32>,
    ) -> AppResult<Vec<WorkoutSession>> {
        let limit = limit
            .unwrap_or(limits::DEFAULT_SESSION_PAGE)
            .clamp(1, limits::MAX_SESSION_PAGE);

        let rows = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM workout_sessions WHERE user_id = $1 ORDER BY started_at DESC, rowid DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id.to_string())
        .bind(i64::from(limit))
        .bind(i64::from(skip))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list workout sessions: {e}")))?;

        rows.iter().map(row_to_session).collect()
    }
}

/// Whole minutes between start and close, rounded down
fn duration_minutes(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> AppResult<i64> {
    let seconds = (ended_at - started_at).num_seconds();
    if seconds < 0 {
        return Err(AppError::invalid_input(format!(
            "Session cannot end at {ended_at} before it started at {started_at}"
        )));
    }
    Ok(seconds.div_euclid(session_consts::SECONDS_PER_MINUTE))
}

/// Insert an empty exercise record unless one already exists; returns whether it was created
async fn insert_exercise_if_missing(
    conn: &mut SqliteConnection,
    session_id: Uuid,
    exercise_id: Uuid,
) -> AppResult<bool> {
    let result = sqlx::query(
        r"
        INSERT INTO session_exercises (id, session_id, exercise_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (session_id, exercise_id) DO NOTHING
        ",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(session_id.to_string())
    .bind(exercise_id.to_string())
    .execute(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to create session exercise: {e}")))?;
    Ok(result.rows_affected() > 0)
}

async fn fetch_session(
    conn: &mut SqliteConnection,
    session_id: Uuid,
    user_id: Uuid,
) -> AppResult<Option<WorkoutSession>> {
    let row = sqlx::query(&format!(
        "SELECT {SESSION_COLUMNS} FROM workout_sessions WHERE id = $1 AND user_id = $2"
    ))
    .bind(session_id.to_string())
    .bind(user_id.to_string())
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to get workout session: {e}")))?;

    row.map(|r| row_to_session(&r)).transpose()
}

/// Load an exercise record whose session belongs to `user_id`
pub(super) async fn fetch_owned_exercise(
    conn: &mut SqliteConnection,
    session_exercise_id: Uuid,
    user_id: Uuid,
) -> AppResult<SessionExercise> {
    let row = sqlx::query(&format!(
        r"
        SELECT {EXERCISE_COLUMNS}
        FROM session_exercises se
        JOIN workout_sessions ws ON ws.id = se.session_id
        WHERE se.id = $1 AND ws.user_id = $2
        "
    ))
    .bind(session_exercise_id.to_string())
    .bind(user_id.to_string())
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to get session exercise: {e}")))?;

    row.map(|r| row_to_session_exercise(&r))
        .transpose()?
        .ok_or_else(|| {
            AppError::not_found("Session exercise")
                .with_resource_id(session_exercise_id.to_string())
                .with_user_id(user_id)
        })
}

fn row_to_session(row: &SqliteRow) -> AppResult<WorkoutSession> {
    Ok(WorkoutSession {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        plan_id: optional_uuid_column(row, "plan_id")?,
        plan_day_id: optional_uuid_column(row, "plan_day_id")?,
        started_at: timestamp_column(row, "started_at")?,
        ended_at: optional_timestamp_column(row, "ended_at")?,
        duration_minutes: column(row, "duration_minutes")?,
        total_calories_burned: column(row, "total_calories_burned")?,
        overall_form_score: column(row, "overall_form_score")?,
        notes: column(row, "notes")?,
        user_rating: column(row, "user_rating")?,
        fatigue_level: column(row, "fatigue_level")?,
    })
}

pub(super) fn row_to_session_exercise(row: &SqliteRow) -> AppResult<SessionExercise> {
    Ok(SessionExercise {
        id: uuid_column(row, "id")?,
        session_id: uuid_column(row, "session_id")?,
        exercise_id: uuid_column(row, "exercise_id")?,
        sets_completed: column(row, "sets_completed")?,
        reps_completed: json_column(row, "reps_completed")?,
        weight_used_kg: json_column(row, "weight_used_kg")?,
        avg_form_score: column(row, "avg_form_score")?,
        version: column(row, "version")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_duration_rounds_down_to_whole_minutes() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        assert_eq!(duration_minutes(start, start + Duration::seconds(59)).unwrap(), 0);
        assert_eq!(duration_minutes(start, start + Duration::seconds(95 * 60 + 59)).unwrap(), 95);
        assert_eq!(duration_minutes(start, start).unwrap(), 0);
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        assert!(duration_minutes(start, start - Duration::seconds(1)).is_err());
    }
}
