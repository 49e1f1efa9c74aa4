// ABOUTME: Workout and diet plan storage backing the single-active-plan policy
// ABOUTME: SQL PlanStore/PlanUnitOfWork over one SQLite transaction plus plan queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

use async_trait::async_trait;
use athletix_core::errors::{AppError, AppResult};
use athletix_core::models::{
    DietPlan, DietType, Difficulty, FitnessGoal, NewDietPlan, NewWorkoutPlan, Plan, PlanDraft,
    PlanKind, WorkoutPlan,
};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::mappers::{column, format_timestamp, timestamp_column, uuid_column};
use super::profiles::fetch_profile;
use super::transactions::SqliteTransactionGuard;
use super::TransactionGuard;
use crate::plans::{
    diet_plan_draft, validate_workout_plan, PlanStore, PlanUnitOfWork, SingleActivePlanPolicy,
};

const WORKOUT_PLAN_COLUMNS: &str = "id, user_id, name, description, fitness_goal, difficulty, \
     duration_weeks, days_per_week, is_active, is_ai_generated, created_at, updated_at";

const DIET_PLAN_COLUMNS: &str = "id, user_id, name, description, diet_type, fitness_goal, \
     duration_days, total_daily_calories, daily_protein_g, daily_carbs_g, daily_fat_g, \
     is_active, is_ai_generated, created_at";

const fn table_for(kind: PlanKind) -> &'static str {
    match kind {
        PlanKind::Workout => "workout_plans",
        PlanKind::Diet => "diet_plans",
    }
}

/// `PlanStore` whose units of work are `SQLite` transactions
#[derive(Clone)]
pub struct SqlPlanStore {
    pool: SqlitePool,
}

impl SqlPlanStore {
    /// Create a store over a pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for SqlPlanStore {
    async fn begin(&self) -> AppResult<Box<dyn PlanUnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        Ok(Box::new(SqlPlanUnitOfWork {
            guard: TransactionGuard::new(tx),
        }))
    }
}

/// One plan change inside a `SQLite` transaction; rolled back on drop
pub struct SqlPlanUnitOfWork {
    guard: SqliteTransactionGuard<'static>,
}

#[async_trait]
impl PlanUnitOfWork for SqlPlanUnitOfWork {
    async fn deactivate_all_of_kind(&mut self, user_id: Uuid, kind: PlanKind) -> AppResult<u64> {
        let query = match kind {
            PlanKind::Workout => sqlx::query(
                "UPDATE workout_plans SET is_active = 0, updated_at = $1 WHERE user_id = $2 AND is_active = 1",
            )
            .bind(format_timestamp(Utc::now()))
            .bind(user_id.to_string()),
            PlanKind::Diet => sqlx::query(
                "UPDATE diet_plans SET is_active = 0 WHERE user_id = $1 AND is_active = 1",
            )
            .bind(user_id.to_string()),
        };

        let result = query
            .execute(self.guard.executor()?)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to deactivate {}: {e}", table_for(kind)))
            })?;
        debug!(
            user_id = %user_id,
            plan_kind = %kind,
            deactivated = result.rows_affected(),
            "Deactivated existing plans"
        );
        Ok(result.rows_affected())
    }

    async fn insert_active(&mut self, user_id: Uuid, draft: &PlanDraft) -> AppResult<Plan> {
        let now = Utc::now();
        match draft {
            PlanDraft::Workout(input) => {
                let plan = WorkoutPlan {
                    id: Uuid::new_v4(),
                    user_id,
                    name: input.name.trim().to_owned(),
                    description: input.description.clone(),
                    fitness_goal: input.fitness_goal,
                    difficulty: input.difficulty,
                    duration_weeks: input.duration_weeks,
                    days_per_week: input.days_per_week,
                    is_active: true,
                    is_ai_generated: false,
                    created_at: now,
                    updated_at: now,
                };
                sqlx::query(
                    r"
                    INSERT INTO workout_plans (
                        id, user_id, name, description, fitness_goal, difficulty,
                        duration_weeks, days_per_week, is_active, is_ai_generated,
                        created_at, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                    ",
                )
                .bind(plan.id.to_string())
                .bind(plan.user_id.to_string())
                .bind(&plan.name)
                .bind(plan.description.as_deref())
                .bind(plan.fitness_goal.as_str())
                .bind(plan.difficulty.as_str())
                .bind(plan.duration_weeks)
                .bind(plan.days_per_week)
                .bind(plan.is_active)
                .bind(plan.is_ai_generated)
                .bind(format_timestamp(plan.created_at))
                .bind(format_timestamp(plan.updated_at))
                .execute(self.guard.executor()?)
                .await
                .map_err(|e| AppError::database(format!("Failed to create workout plan: {e}")))?;
                Ok(Plan::Workout(plan))
            }
            PlanDraft::Diet(resolved) => {
                let plan = DietPlan {
                    id: Uuid::new_v4(),
                    user_id,
                    name: resolved.name.clone(),
                    description: resolved.description.clone(),
                    diet_type: resolved.diet_type,
                    fitness_goal: resolved.fitness_goal,
                    duration_days: resolved.duration_days,
                    total_daily_calories: resolved.total_daily_calories,
                    daily_protein_g: resolved.daily_protein_g,
                    daily_carbs_g: resolved.daily_carbs_g,
                    daily_fat_g: resolved.daily_fat_g,
                    is_active: true,
                    is_ai_generated: false,
                    created_at: now,
                };
                sqlx::query(
                    r"
                    INSERT INTO diet_plans (
                        id, user_id, name, description, diet_type, fitness_goal, duration_days,
                        total_daily_calories, daily_protein_g, daily_carbs_g, daily_fat_g,
                        is_active, is_ai_generated, created_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                    ",
                )
                .bind(plan.id.to_string())
                .bind(plan.user_id.to_string())
                .bind(&plan.name)
                .bind(plan.description.as_deref())
                .bind(plan.diet_type.as_str())
                .bind(plan.fitness_goal.as_str())
                .bind(plan.duration_days)
                .bind(plan.total_daily_calories)
                .bind(plan.daily_protein_g)
                .bind(plan.daily_carbs_g)
                .bind(plan.daily_fat_g)
                .bind(plan.is_active)
                .bind(plan.is_ai_generated)
                .bind(format_timestamp(plan.created_at))
                .execute(self.guard.executor()?)
                .await
                .map_err(|e| AppError::database(format!("Failed to create diet plan: {e}")))?;
                Ok(Plan::Diet(plan))
            }
        }
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.guard.commit().await
    }
}

/// Database manager for workout and diet plans
pub struct PlanManager {
    pool: SqlitePool,
    policy: SingleActivePlanPolicy<SqlPlanStore>,
}

impl PlanManager {
    /// Create a new plan manager
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        let policy = SingleActivePlanPolicy::new(SqlPlanStore::new(pool.clone()));
        Self { pool, policy }
    }

    /// Override the retry budget for contended plan creation
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.policy = self.policy.with_max_attempts(max_attempts);
        self
    }

    /// Create a workout plan as the user's active workout plan
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or a database error
    pub async fn create_workout_plan(
        &self,
        user_id: Uuid,
        input: NewWorkoutPlan,
    ) -> AppResult<WorkoutPlan> {
        validate_workout_plan(&input)?;
        match self
            .policy
            .create_plan(user_id, &PlanDraft::Workout(input))
            .await?
        {
            Plan::Workout(plan) => Ok(plan),
            Plan::Diet(_) => Err(AppError::internal(
                "Plan store returned a diet plan for a workout draft",
            )),
        }
    }

    /// Create a diet plan as the user's active diet plan
    ///
    /// Calorie and macro targets are copied from the profile as it is now.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or a database error
    pub async fn create_diet_plan(&self, user_id: Uuid, input: NewDietPlan) -> AppResult<DietPlan> {
        let profile = {
            let mut conn = self
                .pool
                .acquire()
                .await
                .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
            fetch_profile(&mut *conn, user_id).await?
        };
        let draft = diet_plan_draft(input, profile.as_ref())?;
        debug!(
            user_id = %user_id,
            has_profile = profile.is_some(),
            "Diet plan draft resolved"
        );

        match self.policy.create_plan(user_id, &PlanDraft::Diet(draft)).await? {
            Plan::Diet(plan) => Ok(plan),
            Plan::Workout(_) => Err(AppError::internal(
                "Plan store returned a workout plan for a diet draft",
            )),
        }
    }

    /// The user's active workout plan, if any
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn active_workout_plan(&self, user_id: Uuid) -> AppResult<Option<WorkoutPlan>> {
        let row = sqlx::query(&format!(
            "SELECT {WORKOUT_PLAN_COLUMNS} FROM workout_plans WHERE user_id = $1 AND is_active = 1"
        ))
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get active workout plan: {e}")))?;

        row.map(|r| row_to_workout_plan(&r)).transpose()
    }

    /// The user's active diet plan, if any
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn active_diet_plan(&self, user_id: Uuid) -> AppResult<Option<DietPlan>> {
        let row = sqlx::query(&format!(
            "SELECT {DIET_PLAN_COLUMNS} FROM diet_plans WHERE user_id = $1 AND is_active = 1"
        ))
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get active diet plan: {e}")))?;

        row.map(|r| row_to_diet_plan(&r)).transpose()
    }

    /// All of a user's workout plans, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_workout_plans(&self, user_id: Uuid) -> AppResult<Vec<WorkoutPlan>> {
        let rows = sqlx::query(&format!(
            "SELECT {WORKOUT_PLAN_COLUMNS} FROM workout_plans WHERE user_id = $1 ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list workout plans: {e}")))?;

        rows.iter().map(row_to_workout_plan).collect()
    }

    /// All of a user's diet plans, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_diet_plans(&self, user_id: Uuid) -> AppResult<Vec<DietPlan>> {
        let rows = sqlx::query(&format!(
            "SELECT {DIET_PLAN_COLUMNS} FROM diet_plans WHERE user_id = $1 ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list diet plans: {e}")))?;

        rows.iter().map(row_to_diet_plan).collect()
    }
}

fn row_to_workout_plan(row: &SqliteRow) -> AppResult<WorkoutPlan> {
    let goal: String = column(row, "fitness_goal")?;
    let difficulty: String = column(row, "difficulty")?;

    Ok(WorkoutPlan {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        name: column(row, "name")?,
        description: column(row, "description")?,
        fitness_goal: FitnessGoal::parse(&goal),
        difficulty: Difficulty::parse(&difficulty),
        duration_weeks: column(row, "duration_weeks")?,
        days_per_week: column(row, "days_per_week")?,
        is_active: column(row, "is_active")?,
        is_ai_generated: column(row, "is_ai_generated")?,
        created_at: timestamp_column(row, "created_at")?,
        updated_at: timestamp_column(row, "updated_at")?,
    })
}

fn row_to_diet_plan(row: &SqliteRow) -> AppResult<DietPlan> {
    let diet_type: String = column(row, "diet_type")?;
    let goal: String = column(row, "fitness_goal")?;

    Ok(DietPlan {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        name: column(row, "name")?,
        description: column(row, "description")?,
        diet_type: DietType::parse(&diet_type),
        fitness_goal: FitnessGoal::parse(&goal),
        duration_days: column(row, "duration_days")?,
        total_daily_calories: column(row, "total_daily_calories")?,
        daily_protein_g: column(row, "daily_protein_g")?,
        daily_carbs_g: column(row, "daily_carbs_g")?,
        daily_fat_g: column(row, "daily_fat_g")?,
        is_active: column(row, "is_active")?,
        is_ai_generated: column(row, "is_ai_generated")?,
        created_at: timestamp_column(row, "created_at")?,
    })
}
