//! Counter error types.

use derive_more::{Display, Error};
use tracing::instrument;

use crate::StorageError;
use crate::db::DbError;

/// Counter persistence error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Counter error: {} at {}:{}", message, file, line)]
pub struct CounterError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl CounterError {
    /// Creates a new counter error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for CounterError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<std::num::ParseIntError> for CounterError {
    #[track_caller]
    fn from(err: std::num::ParseIntError) -> Self {
        Self::new(format!("Malformed counter: {}", err))
    }
}

impl From<serde_json::Error> for CounterError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("JSON error: {}", err))
    }
}

impl From<DbError> for CounterError {
    #[track_caller]
    fn from(err: DbError) -> Self {
        Self::new(err.message)
    }
}

impl From<StorageError> for CounterError {
    #[track_caller]
    fn from(err: StorageError) -> Self {
        Self::new(err.message)
    }
}
