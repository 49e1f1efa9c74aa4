// ABOUTME: Integration tests for the single-active-plan policy
// ABOUTME: Sequential and concurrent creation on SQLite plus an in-memory store with injected failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use athletix_engine::errors::{AppError, AppResult, ErrorCode};
use athletix_engine::models::{
    DietType, Difficulty, FitnessGoal, NewDietPlan, NewWorkoutPlan, Plan, PlanDraft, PlanKind,
    ProfileUpdate, WorkoutPlan,
};
use athletix_engine::plans::{PlanStore, PlanUnitOfWork, SingleActivePlanPolicy};
use chrono::Utc;
use uuid::Uuid;

fn workout_input(name: &str) -> NewWorkoutPlan {
    NewWorkoutPlan {
        name: name.to_owned(),
        fitness_goal: FitnessGoal::MuscleGain,
        difficulty: Difficulty::Intermediate,
        duration_weeks: 8,
        days_per_week: 4,
        description: None,
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Clone, Default)]
struct MemoryPlanStore {
    plans: Arc<Mutex<Vec<Plan>>>,
    fail_insert: bool,
}

impl MemoryPlanStore {
    fn active_of(&self, user_id: Uuid, kind: PlanKind) -> Vec<Plan> {
        self.plans
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id() == user_id && p.kind() == kind && p.is_active())
            .cloned()
            .collect()
    }
}

struct MemoryUnitOfWork {
    plans: Arc<Mutex<Vec<Plan>>>,
    fail_insert: bool,
    deactivations: Vec<(Uuid, PlanKind)>,
    inserts: Vec<Plan>,
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn begin(&self) -> AppResult<Box<dyn PlanUnitOfWork>> {
        Ok(Box::new(MemoryUnitOfWork {
            plans: Arc::clone(&self.plans),
            fail_insert: self.fail_insert,
            deactivations: Vec::new(),
            inserts: Vec::new(),
        }))
    }
}

#[async_trait]
impl PlanUnitOfWork for MemoryUnitOfWork {
    async fn deactivate_all_of_kind(&mut self, user_id: Uuid, kind: PlanKind) -> AppResult<u64> {
        let affected = self
            .plans
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id() == user_id && p.kind() == kind && p.is_active())
            .count();
        self.deactivations.push((user_id, kind));
        Ok(u64::try_from(affected).unwrap())
    }

    async fn insert_active(&mut self, user_id: Uuid, draft: &PlanDraft) -> AppResult<Plan> {
        if self.fail_insert {
            return Err(AppError::database("disk I/O error"));
        }
        let PlanDraft::Workout(input) = draft else {
            return Err(AppError::internal("memory store only holds workout plans"));
        };
        let now = Utc::now();
        let plan = Plan::Workout(WorkoutPlan {
            id: Uuid::new_v4(),
            user_id,
            name: input.name.clone(),
            description: input.description.clone(),
            fitness_goal: input.fitness_goal,
            difficulty: input.difficulty,
            duration_weeks: input.duration_weeks,
            days_per_week: input.days_per_week,
            is_active: true,
            is_ai_generated: false,
            created_at: now,
            updated_at: now,
        });
        self.inserts.push(plan.clone());
        Ok(plan)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut plans = self.plans.lock().unwrap();
        for (user_id, kind) in &self.deactivations {
            for plan in plans
                .iter_mut()
                .filter(|p| p.user_id() == *user_id && p.kind() == *kind)
            {
                plan.set_active(false);
            }
        }
        plans.extend(self.inserts);
        Ok(())
    }
}

#[tokio::test]
async fn test_policy_keeps_only_newest_plan_active_in_memory() {
    let store = MemoryPlanStore::default();
    let policy = SingleActivePlanPolicy::new(store.clone());
    let user_id = Uuid::new_v4();

    let mut last = None;
    for week in 1..=4 {
        let draft = PlanDraft::Workout(workout_input(&format!("Block {week}")));
        last = Some(policy.create_plan(user_id, &draft).await.unwrap());
    }

    let active = store.active_of(user_id, PlanKind::Workout);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id(), last.unwrap().id());
    assert_eq!(store.plans.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_failed_insert_leaves_previous_plan_active() {
    let store = MemoryPlanStore::default();
    let user_id = Uuid::new_v4();
    let existing = SingleActivePlanPolicy::new(store.clone())
        .create_plan(user_id, &PlanDraft::Workout(workout_input("Current")))
        .await
        .unwrap();

    let failing = MemoryPlanStore {
        plans: Arc::clone(&store.plans),
        fail_insert: true,
    };
    let err = SingleActivePlanPolicy::new(failing)
        .create_plan(user_id, &PlanDraft::Workout(workout_input("Broken")))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);

    let active = store.active_of(user_id, PlanKind::Workout);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id(), existing.id());
}

// ============================================================================
// SQLite store
// ============================================================================

#[tokio::test]
async fn test_sequential_creates_leave_last_plan_active() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();

    let mut created = Vec::new();
    for n in 1..=3 {
        created.push(
            db.plans()
                .create_workout_plan(user_id, workout_input(&format!("Plan {n}")))
                .await
                .unwrap(),
        );
    }

    let active = db.plans().active_workout_plan(user_id).await.unwrap().unwrap();
    assert_eq!(active.id, created[2].id);

    let all = db.plans().list_workout_plans(user_id).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all.iter().filter(|p| p.is_active).count(), 1);
}

#[tokio::test]
async fn test_concurrent_creates_leave_exactly_one_active() {
    const CREATORS: usize = 6;

    let (db, _dir) = common::create_file_database(4).await;
    let user_id = Uuid::new_v4();

    let handles: Vec<_> = (0..CREATORS)
        .map(|n| {
            let plans = db.plans().with_max_attempts(12);
            tokio::spawn(async move {
                plans
                    .create_workout_plan(user_id, workout_input(&format!("Racer {n}")))
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let all = db.plans().list_workout_plans(user_id).await.unwrap();
    assert_eq!(all.len(), CREATORS);
    assert_eq!(all.iter().filter(|p| p.is_active).count(), 1);
}

#[tokio::test]
async fn test_workout_and_diet_plans_are_independent() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();

    let workout = db
        .plans()
        .create_workout_plan(user_id, workout_input("Strength"))
        .await
        .unwrap();
    let diet = db
        .plans()
        .create_diet_plan(user_id, NewDietPlan::default())
        .await
        .unwrap();

    let active_workout = db.plans().active_workout_plan(user_id).await.unwrap().unwrap();
    let active_diet = db.plans().active_diet_plan(user_id).await.unwrap().unwrap();
    assert_eq!(active_workout.id, workout.id);
    assert_eq!(active_diet.id, diet.id);

    // Plans of another user are untouched
    let other = Uuid::new_v4();
    db.plans()
        .create_workout_plan(other, workout_input("Other"))
        .await
        .unwrap();
    let still_active = db.plans().active_workout_plan(user_id).await.unwrap().unwrap();
    assert_eq!(still_active.id, workout.id);
}

#[tokio::test]
async fn test_diet_plan_snapshots_profile_targets() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();

    db.profiles()
        .upsert_profile(
            user_id,
            &ProfileUpdate {
                fitness_goal: Some(FitnessGoal::MuscleGain),
                daily_calorie_target: Some(2000),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap();

    let plan = db
        .plans()
        .create_diet_plan(
            user_id,
            NewDietPlan {
                diet_type: DietType::Vegetarian,
                ..NewDietPlan::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(plan.name, "Vegetarian Plan");
    assert_eq!(plan.fitness_goal, FitnessGoal::MuscleGain);
    assert_eq!(plan.duration_days, 7);
    assert_eq!(plan.total_daily_calories, Some(2000));
    assert!(common::approx_eq(plan.daily_protein_g.unwrap(), 150.0));

    // Later profile edits do not flow into the existing plan
    db.profiles()
        .upsert_profile(
            user_id,
            &ProfileUpdate {
                daily_calorie_target: Some(2600),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap();
    let stored = db.plans().active_diet_plan(user_id).await.unwrap().unwrap();
    assert_eq!(stored.total_daily_calories, Some(2000));
    assert!(common::approx_eq(stored.daily_protein_g.unwrap(), 150.0));
}

#[tokio::test]
async fn test_invalid_plans_are_rejected_without_deactivating() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();
    let current = db
        .plans()
        .create_workout_plan(user_id, workout_input("Current"))
        .await
        .unwrap();

    let mut bad_days = workout_input("Eight days");
    bad_days.days_per_week = 8;
    let err = db
        .plans()
        .create_workout_plan(user_id, bad_days)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);

    let err = db
        .plans()
        .create_workout_plan(user_id, workout_input("  "))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = db
        .plans()
        .create_diet_plan(
            user_id,
            NewDietPlan {
                duration_days: 0,
                ..NewDietPlan::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);

    let active = db.plans().active_workout_plan(user_id).await.unwrap().unwrap();
    assert_eq!(active.id, current.id);
}
