//! Board coordinates in world space.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::BoardError;

const FILES: &str = "abcdefgh";

/// A board cell in world space.
///
/// Squares sit at `x` = file (1..=8), `y` = 0, `z` = rank (1..=8). Any
/// coordinate is representable; nothing here checks that it is on the board.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionValue {
    x: f32,
    y: f32,
    z: f32,
}

impl PositionValue {
    /// Creates a position from raw coordinates.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Position of the square at `file` and `rank`, both 1-based.
    pub const fn square(file: u8, rank: u8) -> Self {
        Self::new(file as f32, 0.0, rank as f32)
    }

    /// Parses an algebraic square name such as `"e2"`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] if the name is not a file `a`-`h` followed by a
    /// rank `1`-`8`.
    #[instrument]
    pub fn from_square_name(name: &str) -> Result<Self, BoardError> {
        let name = name.trim().to_ascii_lowercase();
        let mut chars = name.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(BoardError::new(format!("Invalid square name: '{}'", name)));
        };
        let file = FILES
            .find(file)
            .ok_or_else(|| BoardError::new(format!("Invalid file in square '{}'", name)))?;
        let rank = rank
            .to_digit(10)
            .filter(|r| (1..=8).contains(r))
            .ok_or_else(|| BoardError::new(format!("Invalid rank in square '{}'", name)))?;
        Ok(Self::square(file as u8 + 1, rank as u8))
    }

    /// X coordinate (file axis).
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Y coordinate (height).
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Z coordinate (rank axis).
    pub fn z(&self) -> f32 {
        self.z
    }

    /// File and rank (1-based) if this position is exactly on a board square.
    pub fn file_rank(&self) -> Option<(u8, u8)> {
        let on_grid = |v: f32| v.fract() == 0.0 && (1.0..=8.0).contains(&v);
        if self.y == 0.0 && on_grid(self.x) && on_grid(self.z) {
            Some((self.x as u8, self.z as u8))
        } else {
            None
        }
    }

    /// Algebraic name of the square, if on the board.
    pub fn square_name(&self) -> Option<String> {
        self.file_rank().map(|(file, rank)| {
            let file = FILES.as_bytes()[usize::from(file - 1)] as char;
            format!("{}{}", file, rank)
        })
    }
}

impl std::fmt::Display for PositionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.square_name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "({}, {}, {})", self.x, self.y, self.z),
        }
    }
}
