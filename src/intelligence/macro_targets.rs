// ABOUTME: Derives daily protein, carbohydrate, and fat gram targets from a calorie goal
// ABOUTME: Goal-specific calorie splits with 4/4/9 kcal per gram energy densities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

//! Macro target derivation
//!
//! | goal          | protein | carbs | fat  |
//! |---------------|---------|-------|------|
//! | muscle gain   | 0.30    | 0.45  | 0.25 |
//! | weight loss   | 0.35    | 0.35  | 0.30 |
//! | anything else | 0.25    | 0.50  | 0.25 |
//!
//! Grams are `calories * fraction / kcal_per_gram`, rounded to one decimal.

use athletix_core::constants::macros;
use athletix_core::models::{FitnessGoal, MacroTargets};
use serde::{Deserialize, Serialize};

use super::rounding::round_to_decimals;

/// Fractions of total calories assigned to each macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroSplit {
    /// Protein fraction
    pub protein: f64,
    /// Carbohydrate fraction
    pub carbs: f64,
    /// Fat fraction
    pub fat: f64,
}

impl MacroSplit {
    /// High protein split for hypertrophy
    pub const MUSCLE_GAIN: Self = Self {
        protein: macros::MUSCLE_GAIN_PROTEIN,
        carbs: macros::MUSCLE_GAIN_CARBS,
        fat: macros::MUSCLE_GAIN_FAT,
    };

    /// High protein, lower carbohydrate split for fat loss
    pub const WEIGHT_LOSS: Self = Self {
        protein: macros::WEIGHT_LOSS_PROTEIN,
        carbs: macros::WEIGHT_LOSS_CARBS,
        fat: macros::WEIGHT_LOSS_FAT,
    };

    /// Balanced split for every other goal
    pub const BALANCED: Self = Self {
        protein: macros::BALANCED_PROTEIN,
        carbs: macros::BALANCED_CARBS,
        fat: macros::BALANCED_FAT,
    };

    /// Split used for a goal
    #[must_use]
    pub const fn for_goal(goal: FitnessGoal) -> Self {
        match goal {
            FitnessGoal::MuscleGain => Self::MUSCLE_GAIN,
            FitnessGoal::WeightLoss => Self::WEIGHT_LOSS,
            FitnessGoal::Endurance
            | FitnessGoal::Flexibility
            | FitnessGoal::GeneralFitness
            | FitnessGoal::AthleticPerformance => Self::BALANCED,
        }
    }

    /// Sum of the three fractions (1.0 for every table row)
    #[must_use]
    pub fn total(&self) -> f64 {
        self.protein + self.carbs + self.fat
    }
}

/// Derive gram targets for a daily calorie target and goal
#[must_use]
pub fn derive_macros(calorie_target: u32, goal: FitnessGoal) -> MacroTargets {
    let calories = f64::from(calorie_target);
    let split = MacroSplit::for_goal(goal);

    MacroTargets {
        protein_g: round_to_decimals(
            calories * split.protein / macros::KCAL_PER_G_PROTEIN,
            macros::GRAM_DECIMALS,
        ),
        carbs_g: round_to_decimals(
            calories * split.carbs / macros::KCAL_PER_G_CARBS,
            macros::GRAM_DECIMALS,
        ),
        fat_g: round_to_decimals(
            calories * split.fat / macros::KCAL_PER_G_FAT,
            macros::GRAM_DECIMALS,
        ),
    }
}

/// Goal used when deriving during a profile update
///
/// The goal written by the same update wins, then the stored goal, then general fitness.
#[must_use]
pub fn goal_for_update(update_goal: Option<FitnessGoal>, stored_goal: Option<FitnessGoal>) -> FitnessGoal {
    update_goal.or(stored_goal).unwrap_or_default()
}
