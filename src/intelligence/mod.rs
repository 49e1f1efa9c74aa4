// ABOUTME: Pure scoring and derivation algorithms for the session and metrics engine
// ABOUTME: Form score mapping and smoothing, macro target derivation, and decimal rounding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

//! # Intelligence Module
//!
//! Stateless algorithms with no storage access. The database managers call into these
//! so every formula can be unit-tested on its own.

/// Classification label to score mapping and rolling form score smoothing
pub mod form_score;
/// Calorie target and goal to protein/carb/fat gram targets
pub mod macro_targets;
/// Fixed-decimal rounding shared by the score and macro formulas
pub mod rounding;

pub use form_score::{
    fold_form_scores, overall_form_score, repetition_score, score_for_label, smooth_form_score,
};
pub use macro_targets::{derive_macros, goal_for_update, MacroSplit};
pub use rounding::round_to_decimals;
