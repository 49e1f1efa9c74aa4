// ABOUTME: Workout session models for the session lifecycle
// ABOUTME: WorkoutSession, SessionExercise, start/close inputs, and lifecycle state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::session;
use crate::errors::{AppError, AppResult};

/// Lifecycle state of a workout session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created, `ended_at` unset
    Active,
    /// `ended_at` set
    Closed,
}

/// A single workout performed by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Plan the session follows, if any
    pub plan_id: Option<Uuid>,
    /// Plan day the session follows, if any
    pub plan_day_id: Option<Uuid>,
    /// Set once at creation
    pub started_at: DateTime<Utc>,
    /// Set when the session is closed
    pub ended_at: Option<DateTime<Utc>>,
    /// Whole minutes between start and close
    pub duration_minutes: Option<i64>,
    /// Caller-supplied calories
    pub total_calories_burned: Option<f64>,
    /// Mean of the scored exercises, 0-100
    pub overall_form_score: Option<f64>,
    /// Caller-supplied notes
    pub notes: Option<String>,
    /// 1-5 stars
    pub user_rating: Option<i32>,
    /// 1-10
    pub fatigue_level: Option<i32>,
}

impl WorkoutSession {
    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        if self.ended_at.is_some() {
            SessionState::Closed
        } else {
            SessionState::Active
        }
    }
}

/// One catalog exercise as performed within one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExercise {
    /// Unique identifier
    pub id: Uuid,
    /// Owning session
    pub session_id: Uuid,
    /// Catalog exercise
    pub exercise_id: Uuid,
    /// Number of sets logged
    pub sets_completed: i32,
    /// Reps per set, in order
    pub reps_completed: Vec<i32>,
    /// Weight per set in kg, parallel to `reps_completed`
    pub weight_used_kg: Vec<f64>,
    /// Rolling form score, unset until the first repetition result
    pub avg_form_score: Option<f64>,
    /// Optimistic concurrency version, bumped on every write
    pub version: i64,
}

/// Input for starting a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartSession {
    /// Plan reference (not validated against ownership here)
    pub plan_id: Option<Uuid>,
    /// Plan-day reference (not validated against ownership here)
    pub plan_day_id: Option<Uuid>,
    /// Catalog exercises to pre-create, resolved by the caller from the plan day
    #[serde(default)]
    pub exercise_ids: Vec<Uuid>,
}

/// Optional summary fields supplied when a session is closed
///
/// Zero values and empty notes are treated as "not supplied" and leave the stored
/// value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Calories burned
    pub total_calories_burned: Option<f64>,
    /// Free-form notes
    pub notes: Option<String>,
    /// 1-5 stars
    pub user_rating: Option<i32>,
    /// 1-10
    pub fatigue_level: Option<i32>,
}

impl SessionSummary {
    /// Reject out-of-range values before any mutation
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` for a non-zero rating or fatigue level outside its
    /// bounds, or for negative calories
    pub fn validate(&self) -> AppResult<()> {
        if let Some(calories) = self.total_calories_burned {
            if calories < 0.0 || !calories.is_finite() {
                return Err(AppError::out_of_range(
                    "total_calories_burned",
                    calories,
                    ">= 0",
                ));
            }
        }
        if let Some(rating) = self.supplied_user_rating() {
            if !(session::USER_RATING_MIN..=session::USER_RATING_MAX).contains(&rating) {
                return Err(AppError::out_of_range("user_rating", rating, "1..=5"));
            }
        }
        if let Some(fatigue) = self.supplied_fatigue_level() {
            if !(session::FATIGUE_LEVEL_MIN..=session::FATIGUE_LEVEL_MAX).contains(&fatigue) {
                return Err(AppError::out_of_range("fatigue_level", fatigue, "1..=10"));
            }
        }
        Ok(())
    }

    /// Calories if supplied and non-zero
    #[must_use]
    pub fn supplied_calories(&self) -> Option<f64> {
        self.total_calories_burned.filter(|c| *c != 0.0)
    }

    /// Notes if supplied and non-empty
    #[must_use]
    pub fn supplied_notes(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.is_empty())
    }

    /// Rating if supplied and non-zero
    #[must_use]
    pub fn supplied_user_rating(&self) -> Option<i32> {
        self.user_rating.filter(|r| *r != 0)
    }

    /// Fatigue level if supplied and non-zero
    #[must_use]
    pub fn supplied_fatigue_level(&self) -> Option<i32> {
        self.fatigue_level.filter(|f| *f != 0)
    }
}

/// A session together with its exercise records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
    /// The session row
    pub session: WorkoutSession,
    /// Exercise-in-session records owned by the session
    pub exercises: Vec<SessionExercise>,
}
