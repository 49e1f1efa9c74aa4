// ABOUTME: Integration tests for the workout session lifecycle
// ABOUTME: Start, exercise records, set logging, close with summary, roll-up, and listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use athletix_engine::errors::ErrorCode;
use athletix_engine::models::{FormStatus, SessionState, SessionSummary, StartSession};
use chrono::{Duration, TimeZone, Utc};
use common::{approx_eq, repetition};
use uuid::Uuid;

#[tokio::test]
async fn test_start_session_precreates_distinct_exercises() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();
    let plan_id = Uuid::new_v4();
    let squat = Uuid::new_v4();
    let press = Uuid::new_v4();

    let session = db
        .sessions()
        .start_session(
            user_id,
            StartSession {
                plan_id: Some(plan_id),
                plan_day_id: None,
                exercise_ids: vec![squat, press, squat],
            },
        )
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::Active);
    assert_eq!(session.plan_id, Some(plan_id));
    assert!(session.ended_at.is_none());

    let detail = db.sessions().get_session(session.id, user_id).await.unwrap();
    let exercise_ids: Vec<Uuid> = detail.exercises.iter().map(|e| e.exercise_id).collect();
    assert_eq!(exercise_ids, vec![squat, press]);
    for exercise in &detail.exercises {
        assert_eq!(exercise.sets_completed, 0);
        assert!(exercise.reps_completed.is_empty());
        assert!(exercise.avg_form_score.is_none());
    }
}

#[tokio::test]
async fn test_add_exercise_is_get_or_create() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();
    let exercise_id = Uuid::new_v4();
    let session = db
        .sessions()
        .start_session(user_id, StartSession::default())
        .await
        .unwrap();

    let first = db
        .sessions()
        .add_exercise(session.id, user_id, exercise_id)
        .await
        .unwrap();
    let second = db
        .sessions()
        .add_exercise(session.id, user_id, exercise_id)
        .await
        .unwrap();
    assert_eq!(first.id, second.id);

    let detail = db.sessions().get_session(session.id, user_id).await.unwrap();
    assert_eq!(detail.exercises.len(), 1);

    let err = db
        .sessions()
        .add_exercise(session.id, Uuid::new_v4(), exercise_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_record_set_keeps_reps_and_weights_parallel() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();
    let session = db
        .sessions()
        .start_session(user_id, StartSession::default())
        .await
        .unwrap();
    let exercise = db
        .sessions()
        .add_exercise(session.id, user_id, Uuid::new_v4())
        .await
        .unwrap();

    db.sessions()
        .record_set(exercise.id, user_id, 10, Some(60.0))
        .await
        .unwrap();
    let updated = db
        .sessions()
        .record_set(exercise.id, user_id, 8, None)
        .await
        .unwrap();

    assert_eq!(updated.sets_completed, 2);
    assert_eq!(updated.reps_completed, vec![10, 8]);
    assert_eq!(updated.weight_used_kg.len(), 2);
    assert!(approx_eq(updated.weight_used_kg[0], 60.0));
    assert!(approx_eq(updated.weight_used_kg[1], 0.0));
    assert_eq!(updated.version, 2);

    let err = db
        .sessions()
        .record_set(exercise.id, user_id, -1, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);

    let err = db
        .sessions()
        .record_set(exercise.id, Uuid::new_v4(), 5, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_close_derives_whole_minute_duration() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();
    let started = Utc.with_ymd_and_hms(2025, 3, 1, 7, 0, 0).unwrap();

    let session = db
        .sessions()
        .start_session_at(user_id, StartSession::default(), started)
        .await
        .unwrap();

    let closed = db
        .sessions()
        .end_session_at(
            session.id,
            user_id,
            &SessionSummary::default(),
            started + Duration::minutes(95) + Duration::seconds(59),
        )
        .await
        .unwrap();

    assert_eq!(closed.state(), SessionState::Closed);
    assert_eq!(closed.duration_minutes, Some(95));
    assert!(closed.overall_form_score.is_none(), "no exercise was scored");
}

#[tokio::test]
async fn test_zero_summary_values_leave_stored_fields_untouched() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();
    let session = db
        .sessions()
        .start_session(user_id, StartSession::default())
        .await
        .unwrap();

    let first = SessionSummary {
        total_calories_burned: Some(420.0),
        notes: Some("Felt strong".to_owned()),
        user_rating: Some(4),
        fatigue_level: Some(6),
    };
    db.sessions()
        .end_session(session.id, user_id, &first)
        .await
        .unwrap();

    let zeros = SessionSummary {
        total_calories_burned: Some(0.0),
        notes: Some(String::new()),
        user_rating: Some(0),
        fatigue_level: Some(0),
    };
    let closed = db
        .sessions()
        .end_session(session.id, user_id, &zeros)
        .await
        .unwrap();

    assert!(approx_eq(closed.total_calories_burned.unwrap(), 420.0));
    assert_eq!(closed.notes.as_deref(), Some("Felt strong"));
    assert_eq!(closed.user_rating, Some(4));
    assert_eq!(closed.fatigue_level, Some(6));
}

#[tokio::test]
async fn test_invalid_summary_is_rejected_without_closing() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();
    let session = db
        .sessions()
        .start_session(user_id, StartSession::default())
        .await
        .unwrap();

    let err = db
        .sessions()
        .end_session(
            session.id,
            user_id,
            &SessionSummary {
                user_rating: Some(9),
                ..SessionSummary::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);

    let detail = db.sessions().get_session(session.id, user_id).await.unwrap();
    assert_eq!(detail.session.state(), SessionState::Active);
}

#[tokio::test]
async fn test_close_rolls_up_scored_exercises_only() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();
    let session = db
        .sessions()
        .start_session(user_id, StartSession::default())
        .await
        .unwrap();

    let squat = db
        .sessions()
        .add_exercise(session.id, user_id, Uuid::new_v4())
        .await
        .unwrap();
    let lunge = db
        .sessions()
        .add_exercise(session.id, user_id, Uuid::new_v4())
        .await
        .unwrap();
    // Never scored; must not count as zero
    db.sessions()
        .add_exercise(session.id, user_id, Uuid::new_v4())
        .await
        .unwrap();

    let forms = db.form_analysis();
    forms
        .record_repetition(user_id, &repetition(squat.id, squat.exercise_id, 1, FormStatus::Correct))
        .await
        .unwrap();
    for (rep, status) in [(1, FormStatus::Correct), (2, FormStatus::Partial), (3, FormStatus::Incorrect)] {
        forms
            .record_repetition(user_id, &repetition(lunge.id, lunge.exercise_id, rep, status))
            .await
            .unwrap();
    }

    let closed = db
        .sessions()
        .end_session(session.id, user_id, &SessionSummary::default())
        .await
        .unwrap();

    // mean(100, 37.5)
    assert!(approx_eq(closed.overall_form_score.unwrap(), 68.75));
}

#[tokio::test]
async fn test_reclosing_recomputes_duration_and_score() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();
    let started = Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap();
    let session = db
        .sessions()
        .start_session_at(user_id, StartSession::default(), started)
        .await
        .unwrap();
    let exercise = db
        .sessions()
        .add_exercise(session.id, user_id, Uuid::new_v4())
        .await
        .unwrap();
    db.form_analysis()
        .record_repetition(
            user_id,
            &repetition(exercise.id, exercise.exercise_id, 1, FormStatus::Correct),
        )
        .await
        .unwrap();

    let first = db
        .sessions()
        .end_session_at(
            session.id,
            user_id,
            &SessionSummary::default(),
            started + Duration::minutes(30),
        )
        .await
        .unwrap();
    assert_eq!(first.duration_minutes, Some(30));
    assert!(approx_eq(first.overall_form_score.unwrap(), 100.0));

    db.form_analysis()
        .record_repetition(
            user_id,
            &repetition(exercise.id, exercise.exercise_id, 2, FormStatus::Incorrect),
        )
        .await
        .unwrap();

    let second = db
        .sessions()
        .end_session_at(
            session.id,
            user_id,
            &SessionSummary::default(),
            started + Duration::minutes(45),
        )
        .await
        .unwrap();
    assert_eq!(second.duration_minutes, Some(45));
    assert!(approx_eq(second.overall_form_score.unwrap(), 50.0));
    assert!(second.ended_at > first.ended_at);
}

#[tokio::test]
async fn test_close_before_start_is_rejected() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();
    let started = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let session = db
        .sessions()
        .start_session_at(user_id, StartSession::default(), started)
        .await
        .unwrap();

    let err = db
        .sessions()
        .end_session_at(
            session.id,
            user_id,
            &SessionSummary::default(),
            started - Duration::minutes(1),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let detail = db.sessions().get_session(session.id, user_id).await.unwrap();
    assert!(detail.session.ended_at.is_none(), "failed close must roll back");
}

#[tokio::test]
async fn test_sessions_are_scoped_to_their_owner() {
    let db = common::create_test_database().await;
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();
    let session = db
        .sessions()
        .start_session(owner, StartSession::default())
        .await
        .unwrap();

    let err = db
        .sessions()
        .end_session(session.id, other, &SessionSummary::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let err = db.sessions().get_session(session.id, other).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let err = db
        .sessions()
        .end_session(Uuid::new_v4(), owner, &SessionSummary::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let detail = db.sessions().get_session(session.id, owner).await.unwrap();
    assert!(detail.session.ended_at.is_none());
}

#[tokio::test]
async fn test_list_user_sessions_pages_newest_first() {
    let db = common::create_test_database().await;
    let user_id = Uuid::new_v4();
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();

    let mut ids = Vec::new();
    for day in 0..5 {
        let session = db
            .sessions()
            .start_session_at(user_id, StartSession::default(), base + Duration::days(day))
            .await
            .unwrap();
        ids.push(session.id);
    }
    db.sessions()
        .start_session(Uuid::new_v4(), StartSession::default())
        .await
        .unwrap();

    let page = db
        .sessions()
        .list_user_sessions(user_id, 1, Some(2))
        .await
        .unwrap();
    let page_ids: Vec<Uuid> = page.iter().map(|s| s.id).collect();
    assert_eq!(page_ids, vec![ids[3], ids[2]]);

    let all = db
        .sessions()
        .list_user_sessions(user_id, 0, None)
        .await
        .unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].id, ids[4]);
}
