// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Form scores, macro ratio table, session bounds, and configuration defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

//! Constants module
//!
//! Named values for every default and table the engine uses, grouped by domain so the
//! derivation tables have a single source of truth.

/// Per-repetition form scores for each classification label
pub mod form_scores {
    /// Score for a repetition classified as `correct`
    pub const CORRECT: f64 = 100.0;
    /// Score for a repetition classified as `partial`
    pub const PARTIAL: f64 = 50.0;
    /// Score for a repetition classified as `incorrect`
    pub const INCORRECT: f64 = 0.0;
    /// Decimal places kept for exercise and session form scores
    pub const SCORE_DECIMALS: i32 = 2;
    /// Lowest accepted model confidence
    pub const CONFIDENCE_MIN: f64 = 0.0;
    /// Highest accepted model confidence
    pub const CONFIDENCE_MAX: f64 = 1.0;
}

/// Macronutrient derivation table
pub mod macros {
    /// Energy density of protein (kcal per gram)
    pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
    /// Energy density of carbohydrates (kcal per gram)
    pub const KCAL_PER_G_CARBS: f64 = 4.0;
    /// Energy density of fat (kcal per gram)
    pub const KCAL_PER_G_FAT: f64 = 9.0;
    /// Decimal places kept for derived gram targets
    pub const GRAM_DECIMALS: i32 = 1;

    /// Muscle gain split: protein fraction of total calories
    pub const MUSCLE_GAIN_PROTEIN: f64 = 0.30;
    /// Muscle gain split: carbohydrate fraction of total calories
    pub const MUSCLE_GAIN_CARBS: f64 = 0.45;
    /// Muscle gain split: fat fraction of total calories
    pub const MUSCLE_GAIN_FAT: f64 = 0.25;

    /// Weight loss split: protein fraction of total calories
    pub const WEIGHT_LOSS_PROTEIN: f64 = 0.35;
    /// Weight loss split: carbohydrate fraction of total calories
    pub const WEIGHT_LOSS_CARBS: f64 = 0.35;
    /// Weight loss split: fat fraction of total calories
    pub const WEIGHT_LOSS_FAT: f64 = 0.30;

    /// Balanced split used for every other goal: protein fraction
    pub const BALANCED_PROTEIN: f64 = 0.25;
    /// Balanced split used for every other goal: carbohydrate fraction
    pub const BALANCED_CARBS: f64 = 0.50;
    /// Balanced split used for every other goal: fat fraction
    pub const BALANCED_FAT: f64 = 0.25;
}

/// Session summary bounds
pub mod session {
    /// Lowest accepted user rating
    pub const USER_RATING_MIN: i32 = 1;
    /// Highest accepted user rating
    pub const USER_RATING_MAX: i32 = 5;
    /// Lowest accepted fatigue level
    pub const FATIGUE_LEVEL_MIN: i32 = 1;
    /// Highest accepted fatigue level
    pub const FATIGUE_LEVEL_MAX: i32 = 10;
    /// Seconds per minute used for duration derivation
    pub const SECONDS_PER_MINUTE: i64 = 60;
}

/// Plan defaults
pub mod plans {
    /// Default workout plan length in weeks
    pub const DEFAULT_DURATION_WEEKS: i32 = 4;
    /// Default workout days per week
    pub const DEFAULT_DAYS_PER_WEEK: i32 = 3;
    /// Default diet plan length in days
    pub const DEFAULT_DURATION_DAYS: i32 = 7;
}

/// Pagination limits for history queries
pub mod limits {
    /// Default page size for session history
    pub const DEFAULT_SESSION_PAGE: u32 = 20;
    /// Maximum page size for session history
    pub const MAX_SESSION_PAGE: u32 = 100;
    /// Default page size for form analysis history
    pub const DEFAULT_FORM_HISTORY: u32 = 50;
    /// Maximum page size for form analysis history
    pub const MAX_FORM_HISTORY: u32 = 200;
    /// Default page size for progress history
    pub const DEFAULT_PROGRESS_HISTORY: u32 = 30;
    /// Maximum page size for progress history
    pub const MAX_PROGRESS_HISTORY: u32 = 100;
}

/// Progress snapshot bounds
pub mod progress {
    /// Trailing window of closed sessions rolled into a snapshot
    pub const STATS_WINDOW_DAYS: i64 = 7;
    /// Lowest accepted body fat percentage
    pub const BODY_FAT_MIN: f64 = 0.0;
    /// Highest accepted body fat percentage
    pub const BODY_FAT_MAX: f64 = 100.0;
}

/// Configuration defaults
pub mod defaults {
    /// Default database URL when `DATABASE_URL` is unset
    pub const DATABASE_URL: &str = "sqlite:./data/athletix.db";
    /// Default connection pool size for file-backed databases
    pub const DATABASE_MAX_CONNECTIONS: u32 = 5;
    /// Default `SQLite` busy timeout in milliseconds
    pub const DATABASE_BUSY_TIMEOUT_MS: u64 = 5_000;
    /// Default maximum attempts for a retried unit of work
    pub const TRANSACTION_MAX_RETRIES: u32 = 3;
    /// Base backoff in milliseconds between retried attempts
    pub const TRANSACTION_BACKOFF_BASE_MS: u64 = 10;
}

/// Service identity used in structured logs
pub mod service_names {
    /// Engine service name
    pub const ATHLETIX_ENGINE: &str = "athletix-engine";
}
