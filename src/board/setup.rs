//! Canonical opening layout.

use strum::IntoEnumIterator;

use crate::{PieceKind, PositionValue};

const BACK_RANK: [(PieceKind, PieceKind); 8] = [
    (PieceKind::WhiteRook, PieceKind::BlackRook),
    (PieceKind::WhiteKnight, PieceKind::BlackKnight),
    (PieceKind::WhiteBishop, PieceKind::BlackBishop),
    (PieceKind::WhiteQueen, PieceKind::BlackQueen),
    (PieceKind::WhiteKing, PieceKind::BlackKing),
    (PieceKind::WhiteBishop, PieceKind::BlackBishop),
    (PieceKind::WhiteKnight, PieceKind::BlackKnight),
    (PieceKind::WhiteRook, PieceKind::BlackRook),
];

/// The 32 (kind, position) pairs of a new game, ranks 1, 2, 7, 8 in order.
pub fn standard_layout() -> Vec<(PieceKind, PositionValue)> {
    let files = || 1..=8u8;
    let mut layout = Vec::with_capacity(32);
    layout.extend(files().map(|f| (BACK_RANK[usize::from(f - 1)].0, PositionValue::square(f, 1))));
    layout.extend(files().map(|f| (PieceKind::WhitePawn, PositionValue::square(f, 2))));
    layout.extend(files().map(|f| (PieceKind::BlackPawn, PositionValue::square(f, 7))));
    layout.extend(files().map(|f| (BACK_RANK[usize::from(f - 1)].1, PositionValue::square(f, 8))));
    debug_assert!(PieceKind::iter().all(|k| layout.iter().any(|(kind, _)| *kind == k)));
    layout
}
