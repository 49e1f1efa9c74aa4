// ABOUTME: Main library entry point for the Athletix session and metrics aggregation engine
// ABOUTME: Form scoring, session lifecycle, macro target derivation, and single-active-plan policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

#![deny(unsafe_code)]

//! # Athletix Engine
//!
//! The engine behind workout tracking: it drives workout sessions through their
//! lifecycle, folds per-repetition form verdicts into exercise scores, derives
//! macronutrient targets from a calorie goal, and keeps exactly one active plan of
//! each kind per user. Every operation is one unit of work against a shared `SQLite`
//! store accessed through `sqlx`.
//!
//! ## Architecture
//!
//! - **intelligence**: pure algorithms (score mapping, two-term smoother, macro split)
//! - **plans**: the single-active-plan policy over an abstract plan store
//! - **database**: `SQLite` storage managers and transaction helpers
//! - **config**: environment-driven configuration
//! - **logging**: `tracing` subscriber setup
//!
//! Errors, constants, and domain models live in the `athletix-core` crate and are
//! re-exported here.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use athletix_engine::config::DatabaseConfig;
//! use athletix_engine::database::Database;
//! use athletix_engine::errors::AppResult;
//! use athletix_engine::models::StartSession;
//! use uuid::Uuid;
//!
//! # async fn run(user_id: Uuid, exercise_id: Uuid) -> AppResult<()> {
//! let db = Database::new(&DatabaseConfig::in_memory()).await?;
//! let session = db
//!     .sessions()
//!     .start_session(user_id, StartSession::default())
//!     .await?;
//! let exercise = db.sessions().add_exercise(session.id, user_id, exercise_id).await?;
//! # let _ = exercise;
//! # Ok(())
//! # }
//! ```

/// Environment-driven configuration
pub mod config;

/// `SQLite` storage managers and transaction helpers
pub mod database;

/// Pure scoring and nutrition algorithms
pub mod intelligence;

/// Structured logging setup
pub mod logging;

/// Single-active-plan policy
pub mod plans;

pub use athletix_core::{constants, errors, models};
