// ABOUTME: Transaction management with RAII guards and bounded retry for units of work
// ABOUTME: Rolls back on drop and retries lost updates and lock contention with backoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

//! Transaction management with RAII guards and retry patterns
//!
//! - `TransactionGuard`: wraps a `SQLx` transaction and rolls it back unless committed
//! - `retry_transaction`: re-runs a whole unit of work after a retryable failure
//!
//! Every multi-step engine operation (log append + score update, deactivate + insert,
//! close + roll-up) runs as one guarded transaction, so a failure after partial progress
//! leaves no trace. Retrying re-executes the closure from `begin()` onwards:
//!
//! ```text
//! retry_transaction(|| async {
//!     let mut guard = TransactionGuard::new(pool.begin().await?);
//!     sqlx::query("UPDATE ...").execute(guard.executor()?).await?;
//!     sqlx::query("INSERT ...").execute(guard.executor()?).await?;
//!     guard.commit().await
//! }, max_retries).await
//! ```

use std::future::Future;
use std::time::Duration;

use athletix_core::constants::defaults::TRANSACTION_BACKOFF_BASE_MS;
use athletix_core::errors::{AppError, AppResult, ErrorCode};
use sqlx::{Database, Transaction};
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// Retry a unit of work after a retryable failure
///
/// Retryable failures are optimistic version conflicts (`ConcurrencyConflict`) and
/// transient storage contention (`SQLite` "database is locked"/busy, timeouts).
/// Anything else (not found, invalid input, constraint violations) is returned at once.
///
/// Backoff doubles per attempt starting from 20ms.
///
/// # Errors
///
/// Returns the last error once `max_attempts` attempts have failed, or the first
/// non-retryable error
pub async fn retry_transaction<F, Fut, T>(mut f: F, max_attempts: u32) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempts = 0_u32;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if !is_retryable(&e) {
                    debug!(attempts, error = %e, "Unit of work failed with non-retryable error");
                    return Err(e);
                }
                if attempts >= max_attempts {
                    error!(
                        attempts,
                        max_attempts,
                        error = %e,
                        "Unit of work failed after max retries"
                    );
                    return Err(e);
                }

                let backoff_ms = TRANSACTION_BACKOFF_BASE_MS * (1_u64 << attempts.min(10));
                warn!(
                    attempt = attempts,
                    max_attempts,
                    backoff_ms,
                    error = %e,
                    "Unit of work failed with retryable error, retrying after backoff"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

/// Check whether a failed unit of work may be retried
#[must_use]
pub fn is_retryable(error: &AppError) -> bool {
    if error.is_retryable() {
        return true;
    }
    if error.code != ErrorCode::DatabaseError {
        return false;
    }
    is_transient_storage_error(&error.message)
}

/// Transient storage contention: lock waits, busy handlers, timeouts
fn is_transient_storage_error(message: &str) -> bool {
    let lower = message.to_lowercase();

    if lower.contains("constraint") {
        return false;
    }

    lower.contains("database is locked")
        || lower.contains("locked")
        || lower.contains("busy")
        || lower.contains("deadlock")
        || lower.contains("timeout")
        || lower.contains("timed out")
}

/// RAII guard for database transactions ensuring automatic rollback on drop
///
/// If an error is propagated with `?` before `commit()`, the guard is dropped and
/// `SQLx` rolls the transaction back.
pub struct TransactionGuard<'c, DB: Database> {
    transaction: Option<Transaction<'c, DB>>,
    committed: bool,
}

impl<'c, DB: Database> TransactionGuard<'c, DB> {
    /// Create a new transaction guard from an existing `SQLx` transaction
    #[must_use]
    pub fn new(transaction: Transaction<'c, DB>) -> Self {
        debug!("TransactionGuard created - transaction will auto-rollback if not committed");
        Self {
            transaction: Some(transaction),
            committed: false,
        }
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction was already consumed or the commit fails
    pub async fn commit(mut self) -> AppResult<()> {
        match self.transaction.take() {
            Some(tx) => {
                tx.commit()
                    .await
                    .map_err(|e| AppError::database(format!("Transaction commit failed: {e}")))?;
                self.committed = true;
                debug!("TransactionGuard committed successfully");
                Ok(())
            }
            None => Err(AppError::internal(
                "Transaction already consumed - cannot commit",
            )),
        }
    }

    /// Explicitly roll back the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction was already consumed or the rollback fails
    pub async fn rollback(mut self) -> AppResult<()> {
        match self.transaction.take() {
            Some(tx) => {
                tx.rollback()
                    .await
                    .map_err(|e| AppError::database(format!("Transaction rollback failed: {e}")))?;
                debug!("TransactionGuard rolled back explicitly");
                Ok(())
            }
            None => Err(AppError::internal(
                "Transaction already consumed - cannot rollback",
            )),
        }
    }

    /// Check if the transaction has been committed
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        self.committed
    }

    /// Connection to execute queries on inside the transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was used after commit or rollback
    pub fn executor(&mut self) -> AppResult<&mut <DB as Database>::Connection> {
        self.transaction.as_deref_mut().ok_or_else(|| {
            AppError::internal("Transaction already consumed - guard used after commit/rollback")
        })
    }
}

impl<DB: Database> Drop for TransactionGuard<'_, DB> {
    fn drop(&mut self) {
        if self.transaction.is_some() && !self.committed {
            warn!(
                "TransactionGuard dropped without commit - transaction will be rolled back automatically"
            );
        }
    }
}

/// Type alias for `SQLite` transaction guard
pub type SqliteTransactionGuard<'c> = TransactionGuard<'c, sqlx::Sqlite>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_and_lock_contention_are_retryable() {
        assert!(is_retryable(&AppError::concurrency_conflict("Session exercise")));
        assert!(is_retryable(&AppError::database(
            "error returned from database: (code: 5) database is locked"
        )));
        assert!(is_retryable(&AppError::database("pool timed out while waiting")));
    }

    #[test]
    fn test_logical_failures_are_not_retryable() {
        assert!(!is_retryable(&AppError::not_found("Workout session")));
        assert!(!is_retryable(&AppError::invalid_input("locked label")));
        assert!(!is_retryable(&AppError::database(
            "UNIQUE constraint failed: workout_plans.user_id"
        )));
        assert!(!is_retryable(&AppError::new(
            ErrorCode::SerializationError,
            "busy"
        )));
    }
}
