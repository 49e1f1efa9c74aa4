// ABOUTME: Exercise score aggregation: appends repetition results and folds them into exercise scores
// ABOUTME: Optimistic version check on session_exercises with retry, plus per-exercise form history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

use athletix_core::constants::{defaults, form_scores, limits};
use athletix_core::errors::{AppError, AppResult};
use athletix_core::models::{FormAnalysisLog, FormAnalysisResult, FormStatus, SessionExercise};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::mappers::{column, format_timestamp, json_column, timestamp_column, uuid_column};
use super::sessions::fetch_owned_exercise;
use super::transactions::{retry_transaction, TransactionGuard};
use crate::intelligence::smooth_form_score;

/// Result of recording one repetition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepetitionOutcome {
    /// The appended log entry
    pub log: FormAnalysisLog,
    /// The exercise record with its updated score
    pub exercise: SessionExercise,
}

/// Database manager for per-repetition form analysis
pub struct FormAnalysisManager {
    pool: SqlitePool,
    max_attempts: u32,
}

impl FormAnalysisManager {
    /// Create a new form analysis manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            max_attempts: defaults::TRANSACTION_MAX_RETRIES,
        }
    }

    /// Override the retry budget for contended score updates
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Append a repetition result and fold its score into the exercise record
    ///
    /// The log append and the score update commit together. A concurrent writer that
    /// bumped the record's version first causes the whole unit to be retried, so no
    /// repetition is ever folded twice or lost.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the exercise record does not belong to a session of
    /// this user, `ValueOutOfRange` for a confidence outside `[0, 1]` or a repetition
    /// number below 1, `ConcurrencyConflict` once retries are exhausted, or a database
    /// error
    pub async fn record_repetition(
        &self,
        user_id: Uuid,
        result: &FormAnalysisResult,
    ) -> AppResult<RepetitionOutcome> {
        validate_result(result)?;

        let outcome = retry_transaction(
            || self.record_once(user_id, result),
            self.max_attempts,
        )
        .await?;

        debug!(
            user_id = %user_id,
            session_exercise_id = %result.session_exercise_id,
            rep_number = result.rep_number,
            form_status = %result.form_status,
            avg_form_score = ?outcome.exercise.avg_form_score,
            "Repetition recorded"
        );
        Ok(outcome)
    }

    async fn record_once(
        &self,
        user_id: Uuid,
        result: &FormAnalysisResult,
    ) -> AppResult<RepetitionOutcome> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::new(tx);

        let mut exercise =
            fetch_owned_exercise(guard.executor()?, result.session_exercise_id, user_id).await?;

        let log = FormAnalysisLog {
            id: Uuid::new_v4(),
            session_exercise_id: result.session_exercise_id,
            exercise_id: result.exercise_id,
            user_id,
            rep_number: result.rep_number,
            form_status: result.form_status,
            confidence_score: result.confidence_score,
            errors_detected: result.errors_detected.clone(),
            joint_angles: result.joint_angles.clone(),
            feedback_given: result.feedback_given.clone(),
            keypoints_snapshot: result.keypoints_snapshot.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO form_analysis_logs (
                id, session_exercise_id, exercise_id, user_id, rep_number, form_status,
                confidence_score, errors_detected, joint_angles, feedback_given,
                keypoints_snapshot, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(log.id.to_string())
        .bind(log.session_exercise_id.to_string())
        .bind(log.exercise_id.to_string())
        .bind(log.user_id.to_string())
        .bind(log.rep_number)
        .bind(log.form_status.as_str())
        .bind(log.confidence_score)
        .bind(serde_json::to_string(&log.errors_detected)?)
        .bind(serde_json::to_string(&log.joint_angles)?)
        .bind(log.feedback_given.as_deref())
        .bind(
            log.keypoints_snapshot
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
        )
        .bind(format_timestamp(log.created_at))
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to append form analysis log: {e}")))?;

        let expected_version = exercise.version;
        exercise.avg_form_score = Some(smooth_form_score(exercise.avg_form_score, log.form_status));
        exercise.version += 1;

        let updated = sqlx::query(
            r"
            UPDATE session_exercises
            SET avg_form_score = $1, version = $2
            WHERE id = $3 AND version = $4
            ",
        )
        .bind(exercise.avg_form_score)
        .bind(exercise.version)
        .bind(exercise.id.to_string())
        .bind(expected_version)
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to update exercise form score: {e}")))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::concurrency_conflict("Session exercise")
                .with_resource_id(exercise.id.to_string()));
        }
        guard.commit().await?;

        Ok(RepetitionOutcome { log, exercise })
    }

    /// Recent repetition results for one catalog exercise, newest first
    ///
    /// `limit` defaults to 50 and is capped at 200.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn form_history(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
        limit: Option<u32>,
    ) -> AppResult<Vec<FormAnalysisLog>> {
        let limit = limit
            .unwrap_or(limits::DEFAULT_FORM_HISTORY)
            .clamp(1, limits::MAX_FORM_HISTORY);

        let rows = sqlx::query(
            r"
            SELECT id, session_exercise_id, exercise_id, user_id, rep_number, form_status,
                   confidence_score, errors_detected, joint_angles, feedback_given,
                   keypoints_snapshot, created_at
            FROM form_analysis_logs
            WHERE user_id = $1 AND exercise_id = $2
            ORDER BY created_at DESC, rowid DESC
            LIMIT $3
            ",
        )
        .bind(user_id.to_string())
        .bind(exercise_id.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get form history: {e}")))?;

        let logs = rows
            .iter()
            .map(row_to_form_log)
            .collect::<AppResult<Vec<_>>>()?;
        info!(
            user_id = %user_id,
            exercise_id = %exercise_id,
            entries = logs.len(),
            "Form history loaded"
        );
        Ok(logs)
    }
}

fn validate_result(result: &FormAnalysisResult) -> AppResult<()> {
    let confidence = result.confidence_score;
    if !(form_scores::CONFIDENCE_MIN..=form_scores::CONFIDENCE_MAX).contains(&confidence) {
        return Err(AppError::out_of_range(
            "confidence_score",
            confidence,
            "0.0..=1.0",
        ));
    }
    if result.rep_number < 1 {
        return Err(AppError::out_of_range("rep_number", result.rep_number, ">= 1"));
    }
    Ok(())
}

fn row_to_form_log(row: &SqliteRow) -> AppResult<FormAnalysisLog> {
    let status: String = column(row, "form_status")?;
    let snapshot: Option<String> = column(row, "keypoints_snapshot")?;

    Ok(FormAnalysisLog {
        id: uuid_column(row, "id")?,
        session_exercise_id: uuid_column(row, "session_exercise_id")?,
        exercise_id: uuid_column(row, "exercise_id")?,
        user_id: uuid_column(row, "user_id")?,
        rep_number: column(row, "rep_number")?,
        form_status: status.parse::<FormStatus>()?,
        confidence_score: column(row, "confidence_score")?,
        errors_detected: json_column(row, "errors_detected")?,
        joint_angles: json_column(row, "joint_angles")?,
        feedback_given: column(row, "feedback_given")?,
        keypoints_snapshot: snapshot.map(|s| serde_json::from_str(&s)).transpose()?,
        created_at: timestamp_column(row, "created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use athletix_core::errors::ErrorCode;

    fn result(confidence: f64, rep_number: i32) -> FormAnalysisResult {
        FormAnalysisResult {
            session_exercise_id: Uuid::new_v4(),
            exercise_id: Uuid::new_v4(),
            rep_number,
            form_status: FormStatus::Correct,
            confidence_score: confidence,
            errors_detected: Vec::new(),
            joint_angles: HashMap::new(),
            feedback_given: None,
            keypoints_snapshot: None,
        }
    }

    #[test]
    fn test_confidence_bounds_are_inclusive() {
        assert!(validate_result(&result(0.0, 1)).is_ok());
        assert!(validate_result(&result(1.0, 1)).is_ok());
        let err = validate_result(&result(1.2, 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert!(validate_result(&result(f64::NAN, 1)).is_err());
    }

    #[test]
    fn test_rep_numbers_are_one_based() {
        assert!(validate_result(&result(0.5, 0)).is_err());
    }
}
