// ABOUTME: Database configuration types for SQLite file and in-memory connections
// ABOUTME: Typed DatabaseUrl parsing plus pool size, busy timeout, and migration settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::time::Duration;

use athletix_core::constants::defaults;
use athletix_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use super::{env_var_or, parse_env_or};

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Path to `SQLite` database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for non-`SQLite` URLs or an empty path
    pub fn parse_url(s: &str) -> AppResult<Self> {
        let trimmed = s.trim();
        if trimmed.starts_with("postgres://") || trimmed.starts_with("postgresql://") {
            return Err(AppError::config(format!(
                "Unsupported database URL '{trimmed}': only sqlite is supported"
            )));
        }

        let path_str = trimmed.strip_prefix("sqlite://").unwrap_or_else(|| {
            trimmed.strip_prefix("sqlite:").unwrap_or(trimmed)
        });
        match path_str {
            ":memory:" => Ok(Self::Memory),
            "" => Err(AppError::config("Database URL has an empty path")),
            path => Ok(Self::SQLite {
                path: PathBuf::from(path),
            }),
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".into(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from(
                defaults::DATABASE_URL
                    .strip_prefix("sqlite:")
                    .unwrap_or(defaults::DATABASE_URL),
            ),
        }
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Database connection and management configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
    /// Create the schema on startup
    pub auto_migrate: bool,
    /// Pool size for file-backed databases
    pub max_connections: u32,
    /// How long a connection waits on a locked database before failing
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DatabaseUrl::default(),
            auto_migrate: true,
            max_connections: defaults::DATABASE_MAX_CONNECTIONS,
            busy_timeout_ms: defaults::DATABASE_BUSY_TIMEOUT_MS,
        }
    }
}

impl DatabaseConfig {
    /// Load database configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if database environment variables are invalid
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            url: DatabaseUrl::parse_url(&env_var_or("DATABASE_URL", defaults::DATABASE_URL))?,
            auto_migrate: parse_env_or("AUTO_MIGRATE", true)?,
            max_connections: parse_env_or(
                "DATABASE_MAX_CONNECTIONS",
                defaults::DATABASE_MAX_CONNECTIONS,
            )?,
            busy_timeout_ms: parse_env_or(
                "DATABASE_BUSY_TIMEOUT_MS",
                defaults::DATABASE_BUSY_TIMEOUT_MS,
            )?,
        };
        if config.max_connections == 0 {
            return Err(AppError::config(
                "DATABASE_MAX_CONNECTIONS must be at least 1",
            ));
        }
        Ok(config)
    }

    /// In-memory configuration used by tests and tooling
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: DatabaseUrl::Memory,
            ..Self::default()
        }
    }

    /// Pool size actually used: every connection to `sqlite::memory:` opens a
    /// separate database, so in-memory pools are pinned to one connection
    #[must_use]
    pub const fn effective_max_connections(&self) -> u32 {
        if self.url.is_memory() {
            1
        } else {
            self.max_connections
        }
    }

    /// Busy timeout as a duration
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
