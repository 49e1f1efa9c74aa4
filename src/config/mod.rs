// ABOUTME: Configuration management module for engine settings loaded from the environment
// ABOUTME: Aggregates database, concurrency, and environment settings into EngineConfig
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

//! Configuration module for the Athletix engine
//!
//! Configuration is environment-only. Every default is a named constant in
//! `athletix_core::constants::defaults`.
//!
//! - **Database**: connection URL, pool size, busy timeout, auto-migration
//! - **Concurrency**: retry budget for units of work that lose a race
//! - **Environment**: deployment environment

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use athletix_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Database connection configuration
pub mod database;
/// Deployment environment and retry settings
pub mod environment;

pub use database::{DatabaseConfig, DatabaseUrl};
pub use environment::{ConcurrencyConfig, Environment};

/// Complete engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Database settings
    pub database: DatabaseConfig,
    /// Retry settings for contended units of work
    pub concurrency: ConcurrencyConfig,
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `ConfigInvalid` error if any variable is set to an unparseable value
    pub fn from_env() -> AppResult<Self> {
        info!("Loading engine configuration from environment variables");

        let config = Self {
            environment: Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development")),
            database: DatabaseConfig::from_env()?,
            concurrency: ConcurrencyConfig::from_env()?,
        };

        debug!(
            environment = %config.environment,
            database_url = %config.database.url,
            max_connections = config.database.max_connections,
            max_retries = config.concurrency.max_retries,
            "Engine configuration loaded"
        );
        Ok(config)
    }

    /// One-line summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "environment={} database={} pool={} retries={}",
            self.environment,
            self.database.url,
            self.database.effective_max_connections(),
            self.concurrency.max_retries
        )
    }
}

/// Read an environment variable, falling back to a default when unset
pub(crate) fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an optional environment variable, falling back to a default when unset
pub(crate) fn parse_env_or<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {key} value '{raw}': {e}"))),
        Err(_) => Ok(default),
    }
}
