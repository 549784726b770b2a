//! Presentation boundary and a text-mode presenter.

use std::collections::{BTreeMap, HashMap};

use strum::IntoEnumIterator;
use tracing::{debug, instrument, warn};

use crate::{PieceId, PieceKind, PositionValue};

/// Display layer driven by [`crate::BoardSync`].
///
/// Implementations own the visual proxies; they never hold persisted state.
pub trait Presenter {
    /// Whether a visual template exists for `kind`.
    fn has_prefab(&self, kind: PieceKind) -> bool;
    /// Creates the proxy for a piece.
    fn spawn(&mut self, id: PieceId, kind: PieceKind, position: PositionValue);
    /// Moves an existing proxy.
    fn reposition(&mut self, id: PieceId, position: PositionValue);
    /// Removes a proxy.
    fn destroy(&mut self, id: PieceId);
    /// Highlights a proxy as selected.
    fn mark_selected(&mut self, id: PieceId);
    /// Removes the selection highlight.
    fn mark_deselected(&mut self, id: PieceId);
}

/// Glyph per piece kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefabCatalog {
    glyphs: HashMap<PieceKind, char>,
}

impl PrefabCatalog {
    /// Upper case for white, lower case for black.
    pub fn standard() -> Self {
        let glyphs = PieceKind::iter()
            .map(|kind| {
                let glyph = match kind {
                    PieceKind::WhitePawn | PieceKind::BlackPawn => 'p',
                    PieceKind::WhiteKnight | PieceKind::BlackKnight => 'n',
                    PieceKind::WhiteBishop | PieceKind::BlackBishop => 'b',
                    PieceKind::WhiteRook | PieceKind::BlackRook => 'r',
                    PieceKind::WhiteQueen | PieceKind::BlackQueen => 'q',
                    PieceKind::WhiteKing | PieceKind::BlackKing => 'k',
                };
                let glyph = if kind.is_white() {
                    glyph.to_ascii_uppercase()
                } else {
                    glyph
                };
                (kind, glyph)
            })
            .collect();
        Self { glyphs }
    }

    /// Catalog with exactly the given glyphs.
    pub fn from_glyphs(glyphs: HashMap<PieceKind, char>) -> Self {
        Self { glyphs }
    }

    /// Glyph for `kind`, if mapped.
    pub fn glyph(&self, kind: PieceKind) -> Option<char> {
        self.glyphs.get(&kind).copied()
    }
}

impl Default for PrefabCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sprite {
    glyph: char,
    position: PositionValue,
    selected: bool,
}

/// Presenter that keeps sprites in memory and renders them as an 8x8 grid.
#[derive(Debug, Clone, Default)]
pub struct TextPresenter {
    catalog: PrefabCatalog,
    sprites: BTreeMap<PieceId, Sprite>,
}

impl TextPresenter {
    /// Creates an empty presenter using `catalog`.
    pub fn new(catalog: PrefabCatalog) -> Self {
        Self {
            catalog,
            sprites: BTreeMap::new(),
        }
    }

    /// Number of live sprites.
    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    /// Whether a sprite exists for `id`.
    pub fn contains(&self, id: PieceId) -> bool {
        self.sprites.contains_key(&id)
    }

    /// Whether the sprite for `id` is highlighted.
    pub fn is_selected(&self, id: PieceId) -> bool {
        self.sprites.get(&id).is_some_and(|s| s.selected)
    }

    /// Where the sprite for `id` is drawn.
    pub fn position_of(&self, id: PieceId) -> Option<PositionValue> {
        self.sprites.get(&id).map(|s| s.position)
    }

    /// Glyph drawn on the square at `file` and `rank`.
    pub fn glyph_at(&self, file: u8, rank: u8) -> Option<char> {
        let square = PositionValue::square(file, rank);
        self.sprites
            .values()
            .find(|s| s.position == square)
            .map(|s| s.glyph)
    }

    /// Renders rank 8 at the top; selected pieces are bracketed.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for rank in (1..=8u8).rev() {
            out.push_str(&format!("{} ", rank));
            for file in 1..=8u8 {
                let square = PositionValue::square(file, rank);
                let cell = self.sprites.values().find(|s| s.position == square);
                match cell {
                    Some(s) if s.selected => out.push_str(&format!("[{}]", s.glyph)),
                    Some(s) => out.push_str(&format!(" {} ", s.glyph)),
                    None => out.push_str(" . "),
                }
            }
            out.push('\n');
        }
        out.push_str("   a  b  c  d  e  f  g  h\n");

        let off_board: Vec<_> = self
            .sprites
            .iter()
            .filter(|(_, s)| s.position.file_rank().is_none())
            .collect();
        for (id, sprite) in off_board {
            out.push_str(&format!("off board: {} {} at {}\n", id, sprite.glyph, sprite.position));
        }
        out
    }
}

impl Presenter for TextPresenter {
    fn has_prefab(&self, kind: PieceKind) -> bool {
        self.catalog.glyph(kind).is_some()
    }

    #[instrument(skip(self))]
    fn spawn(&mut self, id: PieceId, kind: PieceKind, position: PositionValue) {
        let Some(glyph) = self.catalog.glyph(kind) else {
            warn!("Spawn requested without prefab");
            return;
        };
        self.sprites.insert(
            id,
            Sprite {
                glyph,
                position,
                selected: false,
            },
        );
    }

    #[instrument(skip(self))]
    fn reposition(&mut self, id: PieceId, position: PositionValue) {
        match self.sprites.get_mut(&id) {
            Some(sprite) => sprite.position = position,
            None => debug!("Reposition of unknown sprite ignored"),
        }
    }

    #[instrument(skip(self))]
    fn destroy(&mut self, id: PieceId) {
        if self.sprites.remove(&id).is_none() {
            debug!("Destroy of unknown sprite ignored");
        }
    }

    fn mark_selected(&mut self, id: PieceId) {
        if let Some(sprite) = self.sprites.get_mut(&id) {
            sprite.selected = true;
        }
    }

    fn mark_deselected(&mut self, id: PieceId) {
        if let Some(sprite) = self.sprites.get_mut(&id) {
            sprite.selected = false;
        }
    }
}
