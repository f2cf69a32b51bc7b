// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store error classification.
//!
//! Only two kinds of failure surface upward: *transient* (the backing
//! store is momentarily contended) and *permanent* (constraint violation,
//! missing row, malformed input). Transient errors are the writer's cue
//! to retry; permanent errors propagate to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite reported BUSY or LOCKED; retryable.
    #[error("database busy: {0}")]
    Busy(String),

    /// Constraint violation (foreign key, CHECK, UNIQUE).
    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// A stored or supplied value outside its closed set.
    #[error("invalid {field}: {value:?}")]
    Invalid { field: &'static str, value: String },

    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True when a retry may succeed without any intervention.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Busy(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(code, message) => match code.code {
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                    StoreError::Busy(message.clone().unwrap_or_else(|| code.to_string()))
                }
                rusqlite::ErrorCode::ConstraintViolation => {
                    StoreError::Constraint(message.clone().unwrap_or_else(|| code.to_string()))
                }
                _ => StoreError::Sqlite(e),
            },
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound("row"),
            _ => StoreError::Sqlite(e),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
