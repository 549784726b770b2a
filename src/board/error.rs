//! Board error types.

use derive_more::{Display, Error};
use tracing::instrument;

use crate::PieceKind;
use crate::db::DbError;

/// Board store error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Board error: {} at {}:{}", message, file, line)]
pub struct BoardError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl BoardError {
    /// Creates a new board error with caller location tracking.
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

impl From<DbError> for BoardError {
    #[track_caller]
    fn from(err: DbError) -> Self {
        Self::new(err.message)
    }
}

impl From<diesel::result::Error> for BoardError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(format!("Diesel error: {}", err))
    }
}

/// Failure while mirroring the store into the presentation layer.
#[derive(Debug, Clone, Display, Error)]
pub enum SyncError {
    /// A piece kind has no visual prefab. Unrecoverable configuration error.
    #[display("No prefab mapped for piece kind {kind}")]
    MissingPrefab {
        /// The unmapped kind.
        kind: PieceKind,
    },
    /// The store rejected a write issued by the presentation layer.
    #[display("{_0}")]
    Store(BoardError),
}

impl From<BoardError> for SyncError {
    fn from(err: BoardError) -> Self {
        Self::Store(err)
    }
}
