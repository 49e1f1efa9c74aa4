// ABOUTME: Form analysis models for per-repetition classification results
// ABOUTME: FormStatus label, incoming FormAnalysisResult, and the append-only FormAnalysisLog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::form_scores;
use crate::errors::AppError;

/// Per-repetition form verdict produced by the external inference step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    /// Repetition performed with correct form
    Correct,
    /// Repetition partially correct
    Partial,
    /// Repetition performed with incorrect form
    Incorrect,
}

impl FormStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Partial => "partial",
            Self::Incorrect => "incorrect",
        }
    }

    /// Numeric score for this label
    #[must_use]
    pub const fn score(self) -> f64 {
        match self {
            Self::Correct => form_scores::CORRECT,
            Self::Partial => form_scores::PARTIAL,
            Self::Incorrect => form_scores::INCORRECT,
        }
    }
}

impl FromStr for FormStatus {
    type Err = AppError;

    /// Unknown labels are a caller contract violation, never defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "correct" => Ok(Self::Correct),
            "partial" => Ok(Self::Partial),
            "incorrect" => Ok(Self::Incorrect),
            other => Err(AppError::invalid_input(format!(
                "Unknown form status label '{other}'"
            ))),
        }
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One repetition result submitted by the client after local inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormAnalysisResult {
    /// Exercise-in-session the repetition belongs to
    pub session_exercise_id: Uuid,
    /// Catalog exercise performed
    pub exercise_id: Uuid,
    /// 1-based repetition number
    pub rep_number: i32,
    /// Classification label
    pub form_status: FormStatus,
    /// Model confidence in `[0, 1]`
    pub confidence_score: f64,
    /// Detected form errors
    #[serde(default)]
    pub errors_detected: Vec<String>,
    /// Joint angles in degrees keyed by joint name
    #[serde(default)]
    pub joint_angles: HashMap<String, f64>,
    /// Feedback text shown to the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_given: Option<String>,
    /// Raw pose snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypoints_snapshot: Option<serde_json::Value>,
}

/// Persisted, immutable log entry for one repetition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormAnalysisLog {
    /// Unique identifier
    pub id: Uuid,
    /// Exercise-in-session the repetition belongs to
    pub session_exercise_id: Uuid,
    /// Catalog exercise performed
    pub exercise_id: Uuid,
    /// User who performed the repetition
    pub user_id: Uuid,
    /// 1-based repetition number
    pub rep_number: i32,
    /// Classification label
    pub form_status: FormStatus,
    /// Model confidence in `[0, 1]`
    pub confidence_score: f64,
    /// Detected form errors
    pub errors_detected: Vec<String>,
    /// Joint angles in degrees keyed by joint name
    pub joint_angles: HashMap<String, f64>,
    /// Feedback text shown to the user
    pub feedback_given: Option<String>,
    /// Raw pose snapshot
    pub keypoints_snapshot: Option<serde_json::Value>,
    /// When the entry was appended
    pub created_at: DateTime<Utc>,
}
