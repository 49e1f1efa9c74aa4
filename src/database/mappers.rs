// ABOUTME: Row conversion helpers shared by the SQLite storage managers
// ABOUTME: Typed column access, UUID and timestamp text encoding, and JSON column decoding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

//! Identifiers are stored as hyphenated UUID text and timestamps as fixed-width
//! RFC 3339 text in UTC, so lexical order equals chronological order.

use athletix_core::errors::{AppError, AppResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;
use sqlx::{Decode, Row, Sqlite, Type};
use uuid::Uuid;

/// Read a column, mapping decode failures to a database error naming the column
pub(crate) fn column<'r, T>(row: &'r SqliteRow, name: &str) -> AppResult<T>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| AppError::database(format!("Failed to get column '{name}': {e}")))
}

/// Read a UUID stored as text
pub(crate) fn uuid_column(row: &SqliteRow, name: &str) -> AppResult<Uuid> {
    let raw: String = column(row, name)?;
    parse_uuid(&raw, name)
}

/// Read a nullable UUID stored as text
pub(crate) fn optional_uuid_column(row: &SqliteRow, name: &str) -> AppResult<Option<Uuid>> {
    let raw: Option<String> = column(row, name)?;
    raw.map(|s| parse_uuid(&s, name)).transpose()
}

/// Read a timestamp stored as RFC 3339 text
pub(crate) fn timestamp_column(row: &SqliteRow, name: &str) -> AppResult<DateTime<Utc>> {
    let raw: String = column(row, name)?;
    parse_timestamp(&raw, name)
}

/// Read a nullable timestamp stored as RFC 3339 text
pub(crate) fn optional_timestamp_column(
    row: &SqliteRow,
    name: &str,
) -> AppResult<Option<DateTime<Utc>>> {
    let raw: Option<String> = column(row, name)?;
    raw.map(|s| parse_timestamp(&s, name)).transpose()
}

/// Decode a JSON text column, treating NULL as the type's default
pub(crate) fn json_column<T>(row: &SqliteRow, name: &str) -> AppResult<T>
where
    T: DeserializeOwned + Default,
{
    let raw: Option<String> = column(row, name)?;
    match raw {
        Some(text) => serde_json::from_str(&text).map_err(|e| {
            AppError::serialization(format!("Invalid JSON in column '{name}': {e}"))
        }),
        None => Ok(T::default()),
    }
}

/// Encode a timestamp for storage
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_uuid(raw: &str, name: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| AppError::database(format!("Invalid UUID in column '{name}': {e}")))
}

/// Decode a timestamp read through a scalar query
pub(crate) fn parse_timestamp(raw: &str, name: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid datetime in column '{name}': {e}")))
}
