// ABOUTME: User profile storage with macro target write-back on calorie target updates
// ABOUTME: Upserts partial profile patches and derives protein, carb, and fat grams in the same unit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

use athletix_core::constants::defaults;
use athletix_core::errors::{AppError, AppResult};
use athletix_core::models::{
    DietType, FitnessGoal, FitnessLevel, MacroTargets, ProfileUpdate, UserProfile,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::mappers::{column, format_timestamp, timestamp_column, uuid_column};
use super::transactions::{retry_transaction, TransactionGuard};
use crate::intelligence::{derive_macros, goal_for_update};

/// Database manager for user profiles
pub struct ProfileManager {
    pool: SqlitePool,
    max_attempts: u32,
}

impl ProfileManager {
    /// Create a new profile manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            max_attempts: defaults::TRANSACTION_MAX_RETRIES,
        }
    }

    /// Override the retry budget for contended writes
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Get a user's profile
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        fetch_profile(&mut *conn, user_id).await
    }

    /// Apply a partial profile patch, creating the profile if needed
    ///
    /// When the patch carries a calorie target, macro targets are derived from it using
    /// the patch goal, else the stored goal, else general fitness. Without a calorie
    /// target the stored macro targets are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a non-positive calorie target, or a database error
    pub async fn upsert_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> AppResult<UserProfile> {
        let calorie_target = match update.daily_calorie_target {
            Some(kcal) if kcal <= 0 => {
                return Err(AppError::invalid_input(format!(
                    "daily_calorie_target must be positive, got {kcal}"
                )));
            }
            Some(kcal) => Some(kcal.unsigned_abs()),
            None => None,
        };

        let now = Utc::now();
        let profile = retry_transaction(
            || self.upsert_once(user_id, update, calorie_target, now),
            self.max_attempts,
        )
        .await?;

        info!(
            user_id = %user_id,
            macros_derived = calorie_target.is_some(),
            "Profile updated"
        );
        Ok(profile)
    }

    async fn upsert_once(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
        calorie_target: Option<u32>,
        now: DateTime<Utc>,
    ) -> AppResult<UserProfile> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::new(tx);

        sqlx::query(
            r"
            INSERT INTO user_profiles (user_id, created_at, updated_at)
            VALUES ($1, $2, $2)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = excluded.updated_at
            ",
        )
        .bind(user_id.to_string())
        .bind(format_timestamp(now))
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to create profile: {e}")))?;

        let stored = fetch_profile(guard.executor()?, user_id)
            .await?
            .ok_or_else(|| AppError::internal("Profile row missing after upsert"))?;

        let macros: Option<MacroTargets> = calorie_target.map(|kcal| {
            derive_macros(kcal, goal_for_update(update.fitness_goal, stored.fitness_goal))
        });

        sqlx::query(
            r"
            UPDATE user_profiles
            SET fitness_goal = COALESCE($1, fitness_goal),
                fitness_level = COALESCE($2, fitness_level),
                diet_type = COALESCE($3, diet_type),
                weight_kg = COALESCE($4, weight_kg),
                height_cm = COALESCE($5, height_cm),
                daily_calorie_target = COALESCE($6, daily_calorie_target),
                protein_target_g = COALESCE($7, protein_target_g),
                carbs_target_g = COALESCE($8, carbs_target_g),
                fat_target_g = COALESCE($9, fat_target_g)
            WHERE user_id = $10
            ",
        )
        .bind(update.fitness_goal.map(|g| g.as_str()))
        .bind(update.fitness_level.map(|l| l.as_str()))
        .bind(update.diet_type.map(|d| d.as_str()))
        .bind(update.weight_kg)
        .bind(update.height_cm)
        .bind(update.daily_calorie_target)
        .bind(macros.map(|m| m.protein_g))
        .bind(macros.map(|m| m.carbs_g))
        .bind(macros.map(|m| m.fat_g))
        .bind(user_id.to_string())
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to update profile: {e}")))?;

        let profile = fetch_profile(guard.executor()?, user_id)
            .await?
            .ok_or_else(|| AppError::internal("Profile row missing after update"))?;
        guard.commit().await?;
        Ok(profile)
    }
}

/// Load a profile inside an existing connection or transaction
pub(super) async fn fetch_profile(
    conn: &mut SqliteConnection,
    user_id: Uuid,
) -> AppResult<Option<UserProfile>> {
    let row = sqlx::query(
        r"
        SELECT user_id, fitness_goal, fitness_level, diet_type, weight_kg, height_cm,
               daily_calorie_target, protein_target_g, carbs_target_g, fat_target_g,
               created_at, updated_at
        FROM user_profiles
        WHERE user_id = $1
        ",
    )
    .bind(user_id.to_string())
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to get profile: {e}")))?;

    row.map(|r| row_to_profile(&r)).transpose()
}

fn row_to_profile(row: &SqliteRow) -> AppResult<UserProfile> {
    let goal: Option<String> = column(row, "fitness_goal")?;
    let level: Option<String> = column(row, "fitness_level")?;
    let diet: Option<String> = column(row, "diet_type")?;

    Ok(UserProfile {
        user_id: uuid_column(row, "user_id")?,
        fitness_goal: goal.as_deref().map(FitnessGoal::parse),
        fitness_level: level.as_deref().map(FitnessLevel::parse),
        diet_type: diet.as_deref().map(DietType::parse),
        weight_kg: column(row, "weight_kg")?,
        height_cm: column(row, "height_cm")?,
        daily_calorie_target: column(row, "daily_calorie_target")?,
        protein_target_g: column(row, "protein_target_g")?,
        carbs_target_g: column(row, "carbs_target_g")?,
        fat_target_g: column(row, "fat_target_g")?,
        created_at: timestamp_column(row, "created_at")?,
        updated_at: timestamp_column(row, "updated_at")?,
    })
}
