// ABOUTME: Shared test helpers for engine integration tests
// ABOUTME: Quiet test logging plus in-memory and temp-file databases with the schema applied
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors
#![allow(dead_code, missing_docs, clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::env;
use std::sync::Once;

use athletix_engine::config::{DatabaseConfig, DatabaseUrl};
use athletix_engine::database::Database;
use athletix_engine::models::{FormAnalysisResult, FormStatus};
use tempfile::TempDir;
use tracing::Level;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; WARN keeps test output quiet
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Migrated in-memory database on a single shared connection
pub async fn create_test_database() -> Database {
    init_test_logging();
    Database::new(&DatabaseConfig::in_memory())
        .await
        .expect("Failed to create in-memory database")
}

/// Migrated file-backed database with a multi-connection pool, for concurrency tests
///
/// The returned `TempDir` must outlive the database.
pub async fn create_file_database(max_connections: u32) -> (Database, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = DatabaseConfig {
        url: DatabaseUrl::SQLite {
            path: dir.path().join("athletix_test.db"),
        },
        auto_migrate: true,
        max_connections,
        busy_timeout_ms: 10_000,
    };
    let db = Database::new(&config)
        .await
        .expect("Failed to create file database");
    (db, dir)
}

/// Repetition result for an exercise record with default payload fields
pub fn repetition(
    session_exercise_id: Uuid,
    exercise_id: Uuid,
    rep_number: i32,
    form_status: FormStatus,
) -> FormAnalysisResult {
    FormAnalysisResult {
        session_exercise_id,
        exercise_id,
        rep_number,
        form_status,
        confidence_score: 0.9,
        errors_detected: Vec::new(),
        joint_angles: HashMap::new(),
        feedback_given: None,
        keypoints_snapshot: None,
    }
}

/// Float comparison with a tolerance suited to two-decimal scores
pub fn approx_eq(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}
