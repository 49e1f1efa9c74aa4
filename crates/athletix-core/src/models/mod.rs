// ABOUTME: Core data models for sessions, form analysis, profiles, plans, and progress
// ABOUTME: Re-exports the domain types shared by the engine and its callers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

/// Per-repetition form analysis models
pub mod form_analysis;
/// Workout and diet plan models
pub mod plan;
/// User profile and macro target models
pub mod profile;
/// Progress snapshot models
pub mod progress;
/// Workout session models
pub mod session;

pub use form_analysis::{FormAnalysisLog, FormAnalysisResult, FormStatus};
pub use plan::{
    DietPlan, DietPlanDraft, Difficulty, NewDietPlan, NewWorkoutPlan, Plan, PlanDraft, PlanKind,
    WorkoutPlan,
};
pub use profile::{DietType, FitnessGoal, FitnessLevel, MacroTargets, ProfileUpdate, UserProfile};
pub use progress::{NewProgressRecord, ProgressRecord};
pub use session::{
    SessionDetail, SessionExercise, SessionState, SessionSummary, StartSession, WorkoutSession,
};
