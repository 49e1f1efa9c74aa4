// ABOUTME: Deployment environment and retry budget configuration
// ABOUTME: Environment enum parsing and ConcurrencyConfig loaded from TRANSACTION_MAX_RETRIES
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

use std::fmt;

use athletix_core::constants::defaults;
use athletix_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use super::parse_env_or;

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            // Default to Development for unrecognized values
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a testing environment
    #[must_use]
    pub const fn is_testing(&self) -> bool {
        matches!(self, Self::Testing)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Retry budget for units of work that hit a version conflict or lock contention
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    /// Total attempts per unit of work, including the first
    pub max_retries: u32,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::TRANSACTION_MAX_RETRIES,
        }
    }
}

impl ConcurrencyConfig {
    /// Load from `TRANSACTION_MAX_RETRIES`
    ///
    /// # Errors
    ///
    /// Returns an error if the value is unparseable or zero
    pub fn from_env() -> AppResult<Self> {
        let max_retries = parse_env_or("TRANSACTION_MAX_RETRIES", defaults::TRANSACTION_MAX_RETRIES)?;
        if max_retries == 0 {
            return Err(AppError::config("TRANSACTION_MAX_RETRIES must be at least 1"));
        }
        Ok(Self { max_retries })
    }
}
