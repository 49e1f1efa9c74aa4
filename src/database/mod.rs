// ABOUTME: Database management for the engine's SQLite store
// ABOUTME: Connection pool setup, schema migrations, and accessors for the storage managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

//! # Database Management
//!
//! One `SqlitePool` is shared by every manager. Each public manager operation is a
//! single unit of work; multi-step operations run inside a [`TransactionGuard`] and are
//! re-executed by [`retry_transaction`] when they lose a race.

mod form_analysis;
pub(crate) mod mappers;
mod plans;
mod profiles;
mod progress;
mod sessions;
/// Transaction guard and retry helpers
pub mod transactions;

use std::fs;

use athletix_core::constants::defaults;
use athletix_core::errors::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::config::{ConcurrencyConfig, DatabaseConfig, DatabaseUrl};

pub use form_analysis::{FormAnalysisManager, RepetitionOutcome};
pub use plans::{PlanManager, SqlPlanStore, SqlPlanUnitOfWork};
pub use profiles::ProfileManager;
pub use progress::ProgressManager;
pub use sessions::SessionManager;
pub use transactions::{retry_transaction, SqliteTransactionGuard, TransactionGuard};

/// Database handle shared by the storage managers
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    max_attempts: u32,
}

impl Database {
    /// Connect and, when `auto_migrate` is set, create the schema
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        let db = Self::connect(config).await?;
        if config.auto_migrate {
            db.migrate().await?;
        }
        Ok(db)
    }

    /// Open a connection pool without touching the schema
    ///
    /// # Errors
    ///
    /// Returns an error if the database directory cannot be created or the pool
    /// cannot connect
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = match &config.url {
            DatabaseUrl::SQLite { path } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|e| {
                        AppError::database(format!(
                            "Failed to create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
            }
            DatabaseUrl::Memory => SqliteConnectOptions::new(),
        }
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout());

        let mut pool_options =
            SqlitePoolOptions::new().max_connections(config.effective_max_connections());
        if config.url.is_memory() {
            // Closing the only connection would drop the in-memory database
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            AppError::database(format!("Failed to connect to {}: {e}", config.url))
        })?;

        info!(
            database_url = %config.url,
            max_connections = config.effective_max_connections(),
            "Database pool connected"
        );
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            max_attempts: defaults::TRANSACTION_MAX_RETRIES,
        }
    }

    /// Apply a retry budget to every manager handed out by this handle
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: ConcurrencyConfig) -> Self {
        self.max_attempts = concurrency.max_retries;
        self
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Session lifecycle operations
    #[must_use]
    pub fn sessions(&self) -> SessionManager {
        SessionManager::new(self.pool.clone()).with_max_attempts(self.max_attempts)
    }

    /// Per-repetition form analysis operations
    #[must_use]
    pub fn form_analysis(&self) -> FormAnalysisManager {
        FormAnalysisManager::new(self.pool.clone()).with_max_attempts(self.max_attempts)
    }

    /// Profile and macro target operations
    #[must_use]
    pub fn profiles(&self) -> ProfileManager {
        ProfileManager::new(self.pool.clone()).with_max_attempts(self.max_attempts)
    }

    /// Workout and diet plan operations
    #[must_use]
    pub fn plans(&self) -> PlanManager {
        PlanManager::new(self.pool.clone()).with_max_attempts(self.max_attempts)
    }

    /// Progress snapshot operations
    #[must_use]
    pub fn progress(&self) -> ProgressManager {
        ProgressManager::new(self.pool.clone()).with_max_attempts(self.max_attempts)
    }

    /// Run database migrations
    ///
    /// Every statement is idempotent, so running it against an existing schema is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_profiles().await?;
        self.migrate_plans().await?;
        self.migrate_sessions().await?;
        self.migrate_form_analysis().await?;
        self.migrate_progress().await?;
        info!("Database schema is up to date");
        Ok(())
    }

    async fn execute_ddl(&self, sql: &str, what: &str) -> AppResult<()> {
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create {what}: {e}")))?;
        debug!(object = what, "Migration statement applied");
        Ok(())
    }

    async fn migrate_profiles(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS user_profiles (
                user_id TEXT PRIMARY KEY,
                fitness_goal TEXT,
                fitness_level TEXT,
                diet_type TEXT,
                weight_kg REAL,
                height_cm REAL,
                daily_calorie_target INTEGER,
                protein_target_g REAL,
                carbs_target_g REAL,
                fat_target_g REAL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            "user_profiles table",
        )
        .await
    }

    async fn migrate_plans(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS workout_plans (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                fitness_goal TEXT NOT NULL,
                difficulty TEXT NOT NULL,
                duration_weeks INTEGER NOT NULL,
                days_per_week INTEGER NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                is_ai_generated INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            "workout_plans table",
        )
        .await?;

        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS diet_plans (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                diet_type TEXT NOT NULL,
                fitness_goal TEXT NOT NULL,
                duration_days INTEGER NOT NULL,
                total_daily_calories INTEGER,
                daily_protein_g REAL,
                daily_carbs_g REAL,
                daily_fat_g REAL,
                is_active INTEGER NOT NULL DEFAULT 1,
                is_ai_generated INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            ",
            "diet_plans table",
        )
        .await?;

        // At most one active plan of each kind per user, enforced by storage as well
        self.execute_ddl(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_workout_plans_one_active ON workout_plans(user_id) WHERE is_active = 1",
            "workout plan active index",
        )
        .await?;
        self.execute_ddl(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_diet_plans_one_active ON diet_plans(user_id) WHERE is_active = 1",
            "diet plan active index",
        )
        .await?;
        self.execute_ddl(
            "CREATE INDEX IF NOT EXISTS idx_workout_plans_user ON workout_plans(user_id, created_at)",
            "workout plan user index",
        )
        .await?;
        self.execute_ddl(
            "CREATE INDEX IF NOT EXISTS idx_diet_plans_user ON diet_plans(user_id, created_at)",
            "diet plan user index",
        )
        .await
    }

    async fn migrate_sessions(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS workout_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                plan_id TEXT,
                plan_day_id TEXT,
                started_at TEXT NOT NULL,
                ended_at TEXT,
                duration_minutes INTEGER,
                total_calories_burned REAL,
                overall_form_score REAL,
                notes TEXT,
                user_rating INTEGER,
                fatigue_level INTEGER
            )
            ",
            "workout_sessions table",
        )
        .await?;

        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS session_exercises (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL REFERENCES workout_sessions(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL,
                sets_completed INTEGER NOT NULL DEFAULT 0,
                reps_completed TEXT NOT NULL DEFAULT '[]',
                weight_used_kg TEXT NOT NULL DEFAULT '[]',
                avg_form_score REAL,
                version INTEGER NOT NULL DEFAULT 0,
                UNIQUE (session_id, exercise_id)
            )
            ",
            "session_exercises table",
        )
        .await?;

        self.execute_ddl(
            "CREATE INDEX IF NOT EXISTS idx_workout_sessions_user ON workout_sessions(user_id, started_at)",
            "workout session user index",
        )
        .await
    }

    async fn migrate_form_analysis(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS form_analysis_logs (
                id TEXT PRIMARY KEY,
                session_exercise_id TEXT NOT NULL REFERENCES session_exercises(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                rep_number INTEGER NOT NULL,
                form_status TEXT NOT NULL,
                confidence_score REAL NOT NULL,
                errors_detected TEXT NOT NULL DEFAULT '[]',
                joint_angles TEXT NOT NULL DEFAULT '{}',
                feedback_given TEXT,
                keypoints_snapshot TEXT,
                created_at TEXT NOT NULL
            )
            ",
            "form_analysis_logs table",
        )
        .await?;

        self.execute_ddl(
            "CREATE INDEX IF NOT EXISTS idx_form_analysis_user_exercise ON form_analysis_logs(user_id, exercise_id, created_at)",
            "form analysis history index",
        )
        .await?;
        self.execute_ddl(
            "CREATE INDEX IF NOT EXISTS idx_form_analysis_session_exercise ON form_analysis_logs(session_exercise_id)",
            "form analysis exercise index",
        )
        .await
    }

    async fn migrate_progress(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS progress_records (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                recorded_at TEXT NOT NULL,
                weight_kg REAL,
                body_fat_percentage REAL,
                workouts_completed INTEGER NOT NULL DEFAULT 0,
                total_workout_minutes INTEGER NOT NULL DEFAULT 0,
                total_calories_burned REAL NOT NULL DEFAULT 0,
                avg_form_score REAL,
                notes TEXT
            )
            ",
            "progress_records table",
        )
        .await?;

        self.execute_ddl(
            "CREATE INDEX IF NOT EXISTS idx_progress_records_user ON progress_records(user_id, recorded_at)",
            "progress record user index",
        )
        .await
    }
}
