//! Database error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Piece or hit counter database error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Database error: {} at {}:{}", message, file, line)]
pub struct DbError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a new database error with caller location tracking.
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

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::Error as Diesel;
        match err {
            Diesel::NotFound => Self::new("Row not found"),
            Diesel::DatabaseError(kind, info) => {
                Self::new(format!("SQLite rejected statement ({:?}): {}", kind, info.message()))
            }
            other => Self::new(format!("Diesel error: {}", other)),
        }
    }
}

/// Failure reported by the embedded migration harness.
impl From<Box<dyn std::error::Error + Send + Sync>> for DbError {
    #[track_caller]
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::new(format!("Migration failed: {}", err))
    }
}
