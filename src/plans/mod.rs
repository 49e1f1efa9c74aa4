// ABOUTME: Plan management module for workout and diet plans
// ABOUTME: Single-active-plan policy over an abstract store plus diet plan draft resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

/// Diet and workout plan draft resolution
pub mod drafts;
/// Single-active-plan policy and the store abstraction it runs against
pub mod policy;

pub use drafts::{diet_plan_draft, validate_workout_plan};
pub use policy::{PlanStore, PlanUnitOfWork, SingleActivePlanPolicy};
