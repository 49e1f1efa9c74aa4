// ABOUTME: Progress snapshot models combining body metrics with rolled-up workout stats
// ABOUTME: ProgressRecord rows and the caller-supplied NewProgressRecord input
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::progress;
use crate::errors::{AppError, AppResult};

/// Point-in-time snapshot of a user's body metrics and recent training volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// When the snapshot was taken
    pub recorded_at: DateTime<Utc>,
    /// Body weight in kg
    pub weight_kg: Option<f64>,
    /// Body fat percentage
    pub body_fat_percentage: Option<f64>,
    /// Sessions closed inside the stats window
    pub workouts_completed: i64,
    /// Sum of their durations in minutes
    pub total_workout_minutes: i64,
    /// Sum of their caller-supplied calories
    pub total_calories_burned: f64,
    /// Mean of their overall form scores, unset when none was scored
    pub avg_form_score: Option<f64>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Body metrics supplied when logging progress; workout stats are derived
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProgressRecord {
    /// Body weight in kg
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// Body fat percentage
    #[serde(default)]
    pub body_fat_percentage: Option<f64>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewProgressRecord {
    /// Reject impossible body metrics before any write
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` for a non-positive weight or a body fat percentage
    /// outside 0-100
    pub fn validate(&self) -> AppResult<()> {
        if let Some(weight) = self.weight_kg {
            if weight <= 0.0 || !weight.is_finite() {
                return Err(AppError::out_of_range("weight_kg", weight, "> 0"));
            }
        }
        if let Some(body_fat) = self.body_fat_percentage {
            if !(progress::BODY_FAT_MIN..=progress::BODY_FAT_MAX).contains(&body_fat) {
                return Err(AppError::out_of_range(
                    "body_fat_percentage",
                    body_fat,
                    "0..=100",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_body_metrics_bounds() {
        assert!(NewProgressRecord::default().validate().is_ok());

        let weightless = NewProgressRecord {
            weight_kg: Some(0.0),
            ..NewProgressRecord::default()
        };
        assert_eq!(weightless.validate().unwrap_err().code, ErrorCode::ValueOutOfRange);

        let body_fat = NewProgressRecord {
            body_fat_percentage: Some(101.0),
            ..NewProgressRecord::default()
        };
        assert!(body_fat.validate().is_err());

        let nan = NewProgressRecord {
            body_fat_percentage: Some(f64::NAN),
            ..NewProgressRecord::default()
        };
        assert!(nan.validate().is_err());
    }
}
