//! Tile value entity and grid positions.
//!
//! A tile is pure data: where it sits, what color it is, and two flags that
//! gate matching and movement. Tiles carry a stable [`TileId`] assigned once
//! at spawn time; the id never changes when the tile moves, so it is safe to
//! use as a map/set key across swaps, gravity, and refills.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Stable, opaque tile identifier.
///
/// Assigned by the grid when a tile is spawned and never reused within a
/// board. Equality and hashing for [`Tile`] are defined by this id alone,
/// which is what allows external view layers to keep tile associations alive
/// while positions churn during cascades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u64);

/// Color of a tile. Match detection compares colors via
/// [`Tile::can_match_with`], never this enum directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl TileColor {
    /// All colors, in palette order. Boards configured with fewer colors use
    /// a prefix of this array.
    pub const ALL: [TileColor; 6] = [
        TileColor::Red,
        TileColor::Blue,
        TileColor::Green,
        TileColor::Yellow,
        TileColor::Purple,
        TileColor::Orange,
    ];

    /// Draw a uniform-random color from the first `palette_size` colors.
    ///
    /// `palette_size` is clamped to `1..=ALL.len()`.
    pub fn random_with<R: Rng>(rng: &mut R, palette_size: usize) -> Self {
        let n = palette_size.clamp(1, Self::ALL.len());
        Self::ALL[rng.gen_range(0..n)]
    }

    /// Single-character initial used by the board's text rendering.
    pub fn initial(&self) -> char {
        match self {
            TileColor::Red => 'R',
            TileColor::Blue => 'B',
            TileColor::Green => 'G',
            TileColor::Yellow => 'Y',
            TileColor::Purple => 'P',
            TileColor::Orange => 'O',
        }
    }
}

/// A cell coordinate on the board.
///
/// `x` grows to the east (columns), `y` grows upward from the bottom row
/// (rows). Coordinates may hold out-of-bounds values; the grid treats those
/// as a silent no-match rather than an error, which keeps boundary-scanning
/// callers free of edge checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct GridPos {
    /// Column (increases going east)
    pub x: i32,
    /// Row (increases going up)
    pub y: i32,
}

impl GridPos {
    /// Create a new position
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position offset by (dx, dy)
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance to another position
    pub fn manhattan_distance(&self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Orthogonal adjacency: exactly one axis differs by 1, the other by 0.
    ///
    /// Diagonals are never neighbors; this is the rule legal swaps enforce.
    pub fn is_neighbor(&self, other: GridPos) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        (dx == 1 && dy == 0) || (dx == 0 && dy == 1)
    }

    /// The four orthogonal neighbors in N, S, W, E order.
    pub fn orthogonal_neighbors(&self) -> [GridPos; 4] {
        [
            self.offset(0, 1),  // North
            self.offset(0, -1), // South
            self.offset(-1, 0), // West
            self.offset(1, 0),  // East
        ]
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single tile on the board.
///
/// The grid is the exclusive owner of tiles; `pos` is kept in sync by every
/// grid mutation (swap, gravity, refill) so a cell and the tile stored there
/// always agree outside an in-flight operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    /// Stable identity, assigned at spawn
    pub id: TileId,
    /// Current cell, maintained by the grid
    pub pos: GridPos,
    /// Color used for match comparison
    pub color: TileColor,
    /// False for tiles temporarily excluded from matching
    /// (mid-destruction, obstacles)
    pub matchable: bool,
    /// False for tiles that cannot be swapped or fall
    pub movable: bool,
}

impl Tile {
    /// Create a normal (matchable, movable) tile
    pub fn new(id: TileId, pos: GridPos, color: TileColor) -> Self {
        Self {
            id,
            pos,
            color,
            matchable: true,
            movable: true,
        }
    }

    /// Whether this tile is orthogonally adjacent to another
    pub fn is_neighbor(&self, other: &Tile) -> bool {
        self.pos.is_neighbor(other.pos)
    }

    /// Whether this tile can form a match with another: both must be
    /// matchable and share the same color.
    pub fn can_match_with(&self, other: &Tile) -> bool {
        self.matchable && other.matchable && self.color == other.color
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tile {}

impl std::hash::Hash for Tile {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tile#{}{} {:?}", self.id.0, self.pos, self.color)
    }
}
