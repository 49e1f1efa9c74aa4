// ABOUTME: Core types and constants for the Athletix session and metrics engine
// ABOUTME: Foundation crate with error handling, named constants, and domain models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

#![deny(unsafe_code)]

//! # Athletix Core
//!
//! Foundation crate providing shared types and constants for the session and metrics
//! engine. It performs no I/O and changes infrequently.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, and the `AppResult` alias
//! - **constants**: form scores, the macro ratio table, bounds, and configuration defaults
//! - **models**: sessions, exercise-in-session records, form analysis, profiles, and plans

/// Unified error handling with standard error codes
pub mod errors;

/// Named constants organized by domain
pub mod constants;

/// Core data models
pub mod models;
