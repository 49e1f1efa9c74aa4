// ABOUTME: Integration tests for profile updates and macro target derivation
// ABOUTME: Goal precedence, untouched macros without a calorie target, and input rejection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use athletix_engine::errors::ErrorCode;
use athletix_engine::models::{DietType, FitnessGoal, FitnessLevel, MacroTargets, ProfileUpdate};
use common::approx_eq;
use uuid::Uuid;

fn assert_macros(targets: Option<MacroTargets>, protein: f64, carbs: f64, fat: f64) {
    let targets = targets.expect("Macro targets should be stored");
    assert!(approx_eq(targets.protein_g, protein), "protein {}", targets.protein_g);
    assert!(approx_eq(targets.carbs_g, carbs), "carbs {}", targets.carbs_g);
    assert!(approx_eq(targets.fat_g, fat), "fat {}", targets.fat_g);
}

#[tokio::test]
async fn test_missing_profile_reads_as_none() {
    let db = common::create_test_database().await;
    assert!(db.profiles().get_profile(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_calorie_target_derives_macros_for_update_goal() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();

    let profile = db
        .profiles()
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

    assert_eq!(profile.fitness_goal, Some(FitnessGoal::MuscleGain));
    assert_eq!(profile.daily_calorie_target, Some(2000));
    assert_macros(profile.macro_targets(), 150.0, 225.0, 55.6);

    let reread = db.profiles().get_profile(user_id).await.unwrap().unwrap();
    assert_macros(reread.macro_targets(), 150.0, 225.0, 55.6);
}

#[tokio::test]
async fn test_stored_goal_is_used_when_update_has_none() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();

    db.profiles()
        .upsert_profile(
            user_id,
            &ProfileUpdate {
                fitness_goal: Some(FitnessGoal::WeightLoss),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap();

    let profile = db
        .profiles()
        .upsert_profile(
            user_id,
            &ProfileUpdate {
                daily_calorie_target: Some(1800),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(profile.fitness_goal, Some(FitnessGoal::WeightLoss));
    assert_macros(profile.macro_targets(), 157.5, 157.5, 60.0);
}

#[tokio::test]
async fn test_no_goal_anywhere_uses_balanced_split() {
    let db = common::create_test_database().await;

    let profile = db
        .profiles()
        .upsert_profile(
            Uuid::new_v4(),
            &ProfileUpdate {
                daily_calorie_target: Some(2400),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap();

    assert!(profile.fitness_goal.is_none());
    assert_macros(profile.macro_targets(), 150.0, 300.0, 66.7);
}

#[tokio::test]
async fn test_update_without_calories_leaves_macros_untouched() {
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

    // Goal change alone does not re-derive
    let profile = db
        .profiles()
        .upsert_profile(
            user_id,
            &ProfileUpdate {
                fitness_goal: Some(FitnessGoal::WeightLoss),
                fitness_level: Some(FitnessLevel::Advanced),
                diet_type: Some(DietType::Vegan),
                weight_kg: Some(82.5),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(profile.fitness_goal, Some(FitnessGoal::WeightLoss));
    assert_eq!(profile.fitness_level, Some(FitnessLevel::Advanced));
    assert_eq!(profile.diet_type, Some(DietType::Vegan));
    assert!(approx_eq(profile.weight_kg.unwrap(), 82.5));
    assert_eq!(profile.daily_calorie_target, Some(2000));
    assert_macros(profile.macro_targets(), 150.0, 225.0, 55.6);
}

#[tokio::test]
async fn test_non_positive_calorie_target_is_rejected() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();

    for kcal in [0, -500] {
        let err = db
            .profiles()
            .upsert_profile(
                user_id,
                &ProfileUpdate {
                    daily_calorie_target: Some(kcal),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    assert!(db.profiles().get_profile(user_id).await.unwrap().is_none());
}
