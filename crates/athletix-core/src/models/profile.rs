// ABOUTME: User profile models read and written by the macro target deriver
// ABOUTME: FitnessGoal, FitnessLevel, DietType, UserProfile, ProfileUpdate, and MacroTargets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fitness objective driving macro splits and plan defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    /// Caloric deficit
    WeightLoss,
    /// Caloric surplus, hypertrophy
    MuscleGain,
    /// Aerobic capacity
    Endurance,
    /// Mobility and range of motion
    Flexibility,
    /// Balanced general fitness
    #[default]
    GeneralFitness,
    /// Sport-specific performance
    AthleticPerformance,
}

impl FitnessGoal {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WeightLoss => "weight_loss",
            Self::MuscleGain => "muscle_gain",
            Self::Endurance => "endurance",
            Self::Flexibility => "flexibility",
            Self::GeneralFitness => "general_fitness",
            Self::AthleticPerformance => "athletic_performance",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "weight_loss" => Self::WeightLoss,
            "muscle_gain" => Self::MuscleGain,
            "endurance" => Self::Endurance,
            "flexibility" => Self::Flexibility,
            "athletic_performance" => Self::AthleticPerformance,
            // Default to GeneralFitness for unrecognized values
            _ => Self::GeneralFitness,
        }
    }
}

impl fmt::Display for FitnessGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-reported training experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FitnessLevel {
    /// New to training
    #[default]
    Beginner,
    /// Some training history
    Intermediate,
    /// Experienced
    Advanced,
}

impl FitnessLevel {
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

/// Dietary pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DietType {
    /// No restriction
    #[default]
    Standard,
    /// Halal
    Halal,
    /// Vegan
    Vegan,
    /// Vegetarian
    Vegetarian,
    /// Ketogenic
    Keto,
    /// Paleo
    Paleo,
}

impl DietType {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Halal => "halal",
            Self::Vegan => "vegan",
            Self::Vegetarian => "vegetarian",
            Self::Keto => "keto",
            Self::Paleo => "paleo",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "halal" => Self::Halal,
            "vegan" => Self::Vegan,
            "vegetarian" => Self::Vegetarian,
            "keto" => Self::Keto,
            "paleo" => Self::Paleo,
            _ => Self::Standard,
        }
    }

    /// Human-readable title used for default plan names
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Halal => "Halal",
            Self::Vegan => "Vegan",
            Self::Vegetarian => "Vegetarian",
            Self::Keto => "Keto",
            Self::Paleo => "Paleo",
        }
    }
}

/// Daily macronutrient gram targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    /// Protein grams
    pub protein_g: f64,
    /// Carbohydrate grams
    pub carbs_g: f64,
    /// Fat grams
    pub fat_g: f64,
}

/// Stored user profile fields the engine reads and writes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Owning user
    pub user_id: Uuid,
    /// Fitness objective
    pub fitness_goal: Option<FitnessGoal>,
    /// Training experience
    pub fitness_level: Option<FitnessLevel>,
    /// Dietary pattern
    pub diet_type: Option<DietType>,
    /// Body weight in kg
    pub weight_kg: Option<f64>,
    /// Height in cm
    pub height_cm: Option<f64>,
    /// Daily calorie target in kcal
    pub daily_calorie_target: Option<i32>,
    /// Derived protein grams
    pub protein_target_g: Option<f64>,
    /// Derived carbohydrate grams
    pub carbs_target_g: Option<f64>,
    /// Derived fat grams
    pub fat_target_g: Option<f64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Empty profile for a user with nothing stored yet
    #[must_use]
    pub fn empty(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            fitness_goal: None,
            fitness_level: None,
            diet_type: None,
            weight_kg: None,
            height_cm: None,
            daily_calorie_target: None,
            protein_target_g: None,
            carbs_target_g: None,
            fat_target_g: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stored macro targets, if all three are present
    #[must_use]
    pub fn macro_targets(&self) -> Option<MacroTargets> {
        Some(MacroTargets {
            protein_g: self.protein_target_g?,
            carbs_g: self.carbs_target_g?,
            fat_g: self.fat_target_g?,
        })
    }
}

/// Partial profile patch; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New fitness objective
    pub fitness_goal: Option<FitnessGoal>,
    /// New training experience
    pub fitness_level: Option<FitnessLevel>,
    /// New dietary pattern
    pub diet_type: Option<DietType>,
    /// New body weight in kg
    pub weight_kg: Option<f64>,
    /// New height in cm
    pub height_cm: Option<f64>,
    /// New calorie target; triggers macro derivation
    pub daily_calorie_target: Option<i32>,
}
