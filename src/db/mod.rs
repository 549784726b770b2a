//! Database persistence layer for board pieces and hit counters.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub use models::{HitCountEntry, NewPieceRow, PieceRow};
pub use repository::{PieceTransaction, Repository};
