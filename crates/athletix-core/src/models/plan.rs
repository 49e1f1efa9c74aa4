// ABOUTME: Workout and diet plan models governed by the single-active-plan policy
// ABOUTME: PlanKind, plan rows, creation drafts, and the kind-erased Plan/PlanDraft enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::{DietType, FitnessGoal};
use crate::constants::plans;

/// Category distinguishing plans for the one-active-plan invariant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    /// Workout plans
    Workout,
    /// Diet plans
    Diet,
}

impl PlanKind {
    /// Convert to string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Workout => "workout",
            Self::Diet => "diet",
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty level of a workout plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Suitable for beginners
    #[default]
    Beginner,
    /// Requires some training history
    Intermediate,
    /// For experienced trainees
    Advanced,
}

impl Difficulty {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "intermediate" => Self::Intermediate,
            "advanced" => Self::Advanced,
            _ => Self::Beginner,
        }
    }
}

/// Stored workout plan header (plan contents live in the plan-content store)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Fitness objective
    pub fitness_goal: FitnessGoal,
    /// Difficulty
    pub difficulty: Difficulty,
    /// Total plan length
    pub duration_weeks: i32,
    /// Training days per week
    pub days_per_week: i32,
    /// Whether this is the user's current workout plan
    pub is_active: bool,
    /// Generated rather than manually authored
    pub is_ai_generated: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Stored diet plan header with targets copied from the profile at creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietPlan {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Dietary pattern
    pub diet_type: DietType,
    /// Fitness objective
    pub fitness_goal: FitnessGoal,
    /// Plan length in days
    pub duration_days: i32,
    /// Calorie target snapshot
    pub total_daily_calories: Option<i32>,
    /// Protein target snapshot
    pub daily_protein_g: Option<f64>,
    /// Carbohydrate target snapshot
    pub daily_carbs_g: Option<f64>,
    /// Fat target snapshot
    pub daily_fat_g: Option<f64>,
    /// Whether this is the user's current diet plan
    pub is_active: bool,
    /// Generated rather than manually authored
    pub is_ai_generated: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Caller input for a new workout plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkoutPlan {
    /// Display name
    pub name: String,
    /// Fitness objective
    pub fitness_goal: FitnessGoal,
    /// Difficulty
    pub difficulty: Difficulty,
    /// Total plan length
    #[serde(default = "default_duration_weeks")]
    pub duration_weeks: i32,
    /// Training days per week
    #[serde(default = "default_days_per_week")]
    pub days_per_week: i32,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

const fn default_duration_weeks() -> i32 {
    plans::DEFAULT_DURATION_WEEKS
}

const fn default_days_per_week() -> i32 {
    plans::DEFAULT_DAYS_PER_WEEK
}

const fn default_duration_days() -> i32 {
    plans::DEFAULT_DURATION_DAYS
}

/// Caller input for a new diet plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDietPlan {
    /// Display name; defaults to "<Diet Type> Plan"
    #[serde(default)]
    pub name: Option<String>,
    /// Dietary pattern
    #[serde(default)]
    pub diet_type: DietType,
    /// Fitness objective; defaults to the profile goal
    #[serde(default)]
    pub fitness_goal: Option<FitnessGoal>,
    /// Plan length in days
    #[serde(default = "default_duration_days")]
    pub duration_days: i32,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for NewDietPlan {
    fn default() -> Self {
        Self {
            name: None,
            diet_type: DietType::default(),
            fitness_goal: None,
            duration_days: default_duration_days(),
            description: None,
        }
    }
}

/// Fully resolved diet plan fields, including the profile target snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct DietPlanDraft {
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Dietary pattern
    pub diet_type: DietType,
    /// Fitness objective
    pub fitness_goal: FitnessGoal,
    /// Plan length in days
    pub duration_days: i32,
    /// Calorie target snapshot
    pub total_daily_calories: Option<i32>,
    /// Protein target snapshot
    pub daily_protein_g: Option<f64>,
    /// Carbohydrate target snapshot
    pub daily_carbs_g: Option<f64>,
    /// Fat target snapshot
    pub daily_fat_g: Option<f64>,
}

/// A plan ready to be inserted as the user's active plan of its kind
#[derive(Debug, Clone)]
pub enum PlanDraft {
    /// Workout plan draft
    Workout(NewWorkoutPlan),
    /// Diet plan draft
    Diet(DietPlanDraft),
}

impl PlanDraft {
    /// Kind governing the one-active-plan invariant
    #[must_use]
    pub const fn kind(&self) -> PlanKind {
        match self {
            Self::Workout(_) => PlanKind::Workout,
            Self::Diet(_) => PlanKind::Diet,
        }
    }
}

/// A stored plan of either kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Plan {
    /// Workout plan
    Workout(WorkoutPlan),
    /// Diet plan
    Diet(DietPlan),
}

impl Plan {
    /// Plan identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::Workout(plan) => plan.id,
            Self::Diet(plan) => plan.id,
        }
    }

    /// Owning user
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        match self {
            Self::Workout(plan) => plan.user_id,
            Self::Diet(plan) => plan.user_id,
        }
    }

    /// Plan kind
    #[must_use]
    pub const fn kind(&self) -> PlanKind {
        match self {
            Self::Workout(_) => PlanKind::Workout,
            Self::Diet(_) => PlanKind::Diet,
        }
    }

    /// Whether the plan is active
    #[must_use]
    pub const fn is_active(&self) -> bool {
        match self {
            Self::Workout(plan) => plan.is_active,
            Self::Diet(plan) => plan.is_active,
        }
    }

    /// Flip the active flag (used by stores when deactivating)
    pub fn set_active(&mut self, active: bool) {
        match self {
            Self::Workout(plan) => plan.is_active = active,
            Self::Diet(plan) => plan.is_active = active,
        }
    }
}
