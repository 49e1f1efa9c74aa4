// ABOUTME: Resolves caller plan input into insertable drafts
// ABOUTME: Diet plans snapshot calorie and macro targets from the profile at creation time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

use athletix_core::errors::{AppError, AppResult};
use athletix_core::models::{DietPlanDraft, NewDietPlan, NewWorkoutPlan, UserProfile};

/// Longest supported training week
const MAX_DAYS_PER_WEEK: i32 = 7;

/// Check workout plan input before it reaches storage
///
/// # Errors
///
/// Returns `InvalidInput` for a blank name, or `ValueOutOfRange` for a non-positive
/// duration or a training week outside 1-7 days
pub fn validate_workout_plan(input: &NewWorkoutPlan) -> AppResult<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::invalid_input("Workout plan name must not be empty"));
    }
    if input.duration_weeks < 1 {
        return Err(AppError::out_of_range(
            "duration_weeks",
            input.duration_weeks,
            ">= 1",
        ));
    }
    if !(1..=MAX_DAYS_PER_WEEK).contains(&input.days_per_week) {
        return Err(AppError::out_of_range(
            "days_per_week",
            input.days_per_week,
            "1..=7",
        ));
    }
    Ok(())
}

/// Resolve a diet plan draft against the profile as it is right now
///
/// Targets are copied verbatim and are not kept in sync with later profile edits.
/// An absent or empty name defaults to "<Diet Type> Plan"; the goal defaults to the profile goal,
/// then general fitness.
///
/// # Errors
///
/// Returns `ValueOutOfRange` for a non-positive duration
pub fn diet_plan_draft(
    input: NewDietPlan,
    profile: Option<&UserProfile>,
) -> AppResult<DietPlanDraft> {
    if input.duration_days < 1 {
        return Err(AppError::out_of_range(
            "duration_days",
            input.duration_days,
            ">= 1",
        ));
    }

    let name = input
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("{} Plan", input.diet_type.title()));
    let fitness_goal = input
        .fitness_goal
        .or_else(|| profile.and_then(|p| p.fitness_goal))
        .unwrap_or_default();

    Ok(DietPlanDraft {
        name,
        description: input.description,
        diet_type: input.diet_type,
        fitness_goal,
        duration_days: input.duration_days,
        total_daily_calories: profile.and_then(|p| p.daily_calorie_target),
        daily_protein_g: profile.and_then(|p| p.protein_target_g),
        daily_carbs_g: profile.and_then(|p| p.carbs_target_g),
        daily_fat_g: profile.and_then(|p| p.fat_target_g),
    })
}
