//! Piece kinds and persisted piece records.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr};
use tracing::instrument;

use crate::db::{NewPieceRow, PieceRow};
use crate::{BoardError, PositionValue};

/// Opaque identity of a persisted piece.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
#[display("#{_0}")]
pub struct PieceId(i32);

impl PieceId {
    /// Wraps a raw database id.
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw database id.
    pub const fn raw(self) -> i32 {
        self.0
    }
}

/// One of the twelve piece kinds.
///
/// The discriminant is the integer stored in the database.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    FromRepr,
)]
#[repr(i32)]
pub enum PieceKind {
    /// White pawn.
    WhitePawn = 0,
    /// White knight.
    WhiteKnight = 1,
    /// White bishop.
    WhiteBishop = 2,
    /// White rook.
    WhiteRook = 3,
    /// White queen.
    WhiteQueen = 4,
    /// White king.
    WhiteKing = 5,
    /// Black pawn.
    BlackPawn = 6,
    /// Black knight.
    BlackKnight = 7,
    /// Black bishop.
    BlackBishop = 8,
    /// Black rook.
    BlackRook = 9,
    /// Black queen.
    BlackQueen = 10,
    /// Black king.
    BlackKing = 11,
}

impl PieceKind {
    /// Integer code persisted for this kind.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Decodes a persisted kind code.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] for codes outside 0-11.
    #[instrument]
    pub fn from_code(code: i32) -> Result<Self, BoardError> {
        Self::from_repr(code)
            .ok_or_else(|| BoardError::new(format!("Unknown piece kind code: {}", code)))
    }

    /// Whether this is a white piece.
    pub const fn is_white(self) -> bool {
        self.code() < 6
    }
}

/// A durable piece: identity, kind and current position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, new)]
pub struct PieceRecord {
    id: PieceId,
    kind: PieceKind,
    position: PositionValue,
}

impl PieceRecord {
    /// Builds the insertable row for a new piece of `session_id`.
    pub(crate) fn new_row(
        session_id: &str,
        kind: PieceKind,
        position: PositionValue,
    ) -> NewPieceRow {
        NewPieceRow::new(
            session_id.to_string(),
            kind.code(),
            position.x(),
            position.y(),
            position.z(),
        )
    }
}

impl TryFrom<PieceRow> for PieceRecord {
    type Error = BoardError;

    fn try_from(row: PieceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PieceId::new(*row.id()),
            kind: PieceKind::from_code(*row.kind())?,
            position: PositionValue::new(*row.x(), *row.y(), *row.z()),
        })
    }
}
