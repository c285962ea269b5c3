//! Board storage: a fixed rectangular grid of tile-or-empty cells.
//!
//! This module contains:
//! - Cell access with silent out-of-bounds handling
//! - The swap primitive used by the resolution engine
//! - Orthogonal neighbor and bulk occupancy queries
//! - Column gravity compaction
//! - Initial board population helpers
//!
//! The grid is the single owner of all tiles. Every mutation keeps each
//! tile's `pos` field and the id index in sync with the cell it occupies.

use crate::config::MIN_MATCH_RUN;
use crate::tile::{GridPos, Tile, TileColor, TileId};
use rand::Rng;
use std::collections::HashMap;
use tracing::warn;

/// A tile movement produced by gravity compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GravityMove {
    /// The tile that fell
    pub id: TileId,
    /// Cell before compaction
    pub from: GridPos,
    /// Cell after compaction
    pub to: GridPos,
}

/// Fixed `width x height` board of cells, each holding zero or one tile.
///
/// Row 0 is the bottom row; gravity compacts toward it. All access is by
/// [`GridPos`]; out-of-bounds reads return `None` and out-of-bounds writes
/// are logged no-ops, so scanning callers never need their own edge checks.
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Option<Tile>>,
    /// Current cell of every live tile, keyed by stable id
    index: HashMap<TileId, GridPos>,
    /// Next id to hand out; ids are never reused within a board
    next_id: u64,
}

impl Grid {
    /// Create an empty grid. Width and height must be positive; the engine
    /// validates its config before constructing one.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width,
            height,
            cells: vec![None; (width * height) as usize],
            index: HashMap::new(),
            next_id: 0,
        }
    }

    /// Board width in columns
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Board height in rows
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Total number of cells
    pub fn total_cells(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.index.len()
    }

    /// Strict half-open bounds check: `0 <= x < width` and `0 <= y < height`.
    pub fn is_valid_position(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    fn cell_index(&self, pos: GridPos) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    // ==================== Cell access ====================

    /// Tile at a position. Out-of-bounds and unoccupied cells both return
    /// `None` — out-of-bounds is a silent no-match, not an error.
    pub fn get(&self, pos: GridPos) -> Option<&Tile> {
        if !self.is_valid_position(pos) {
            return None;
        }
        self.cells[self.cell_index(pos)].as_ref()
    }

    /// Whether an in-bounds cell is unoccupied
    pub fn is_empty(&self, pos: GridPos) -> bool {
        self.is_valid_position(pos) && self.cells[self.cell_index(pos)].is_none()
    }

    /// Place a tile at a position, replacing any occupant. The tile's own
    /// position is synchronized to the cell. Out-of-bounds is a logged no-op.
    pub fn set(&mut self, pos: GridPos, mut tile: Tile) {
        if !self.is_valid_position(pos) {
            warn!(%pos, "set: position out of bounds");
            return;
        }
        let idx = self.cell_index(pos);
        if let Some(evicted) = self.cells[idx].take() {
            self.index.remove(&evicted.id);
        }
        tile.pos = pos;
        self.index.insert(tile.id, pos);
        self.cells[idx] = Some(tile);
    }

    /// Remove and return the tile at a position, if any
    pub fn remove(&mut self, pos: GridPos) -> Option<Tile> {
        if !self.is_valid_position(pos) {
            warn!(%pos, "remove: position out of bounds");
            return None;
        }
        let idx = self.cell_index(pos);
        let removed = self.cells[idx].take();
        if let Some(tile) = &removed {
            self.index.remove(&tile.id);
        }
        removed
    }

    /// Spawn a brand-new tile at a position with a fresh stable id.
    /// Returns `None` (logged) when the position is out of bounds.
    pub fn spawn(&mut self, pos: GridPos, color: TileColor) -> Option<TileId> {
        if !self.is_valid_position(pos) {
            warn!(%pos, "spawn: position out of bounds");
            return None;
        }
        let id = TileId(self.next_id);
        self.next_id += 1;
        self.set(pos, Tile::new(id, pos, color));
        Some(id)
    }

    /// Current cell of a tile, by stable id
    pub fn position_of(&self, id: TileId) -> Option<GridPos> {
        self.index.get(&id).copied()
    }

    // ==================== Swap ====================

    /// Exchange the tiles in two occupied cells and update both tiles'
    /// positions. Logged no-op when either cell is empty or out of bounds.
    ///
    /// Adjacency is NOT validated here; the resolution engine enforces the
    /// neighbor rule before a swap reaches the grid.
    pub fn swap(&mut self, a: GridPos, b: GridPos) {
        if !self.is_valid_position(a) || !self.is_valid_position(b) {
            warn!(%a, %b, "swap: position out of bounds");
            return;
        }
        let ia = self.cell_index(a);
        let ib = self.cell_index(b);
        if self.cells[ia].is_none() || self.cells[ib].is_none() {
            warn!(%a, %b, "swap: both cells must be occupied");
            return;
        }
        self.cells.swap(ia, ib);
        if let Some(tile) = self.cells[ia].as_mut() {
            tile.pos = a;
            self.index.insert(tile.id, a);
        }
        if let Some(tile) = self.cells[ib].as_mut() {
            tile.pos = b;
            self.index.insert(tile.id, b);
        }
    }

    // ==================== Neighborhood ====================

    /// Occupied orthogonal neighbors of a position in N, S, W, E order.
    /// Empty and out-of-bounds directions are omitted; diagonals are never
    /// neighbors.
    pub fn neighbors(&self, pos: GridPos) -> Vec<&Tile> {
        pos.orthogonal_neighbors()
            .iter()
            .filter_map(|&p| self.get(p))
            .collect()
    }

    // ==================== Bulk queries ====================

    /// All unoccupied in-bounds positions, column-major
    pub fn empty_positions(&self) -> Vec<GridPos> {
        let mut empty = Vec::new();
        for x in 0..self.width {
            for y in 0..self.height {
                let pos = GridPos::new(x, y);
                if self.is_empty(pos) {
                    empty.push(pos);
                }
            }
        }
        empty
    }

    /// Whether every cell is occupied
    pub fn is_full(&self) -> bool {
        self.index.len() == self.total_cells()
    }

    /// Remove every tile
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
        self.index.clear();
    }

    // ==================== Gravity ====================

    /// Compact all occupied cells in column `x` downward with no gaps,
    /// preserving relative vertical order. Returns the moves that actually
    /// changed a tile's row; zero-distance moves are excluded.
    pub fn apply_gravity_column(&mut self, x: i32) -> Vec<GravityMove> {
        let mut moves = Vec::new();
        if x < 0 || x >= self.width {
            warn!(column = x, "apply_gravity_column: column out of bounds");
            return moves;
        }

        // Re-seat surviving tiles bottom-up starting at row 0
        let mut target_y = 0;
        for y in 0..self.height {
            let from = GridPos::new(x, y);
            let idx = self.cell_index(from);
            let mut tile = match self.cells[idx].take() {
                Some(tile) => tile,
                None => continue,
            };
            let to = GridPos::new(x, target_y);
            if to != from {
                tile.pos = to;
                self.index.insert(tile.id, to);
                moves.push(GravityMove { id: tile.id, from, to });
            }
            let to_idx = self.cell_index(to);
            self.cells[to_idx] = Some(tile);
            target_y += 1;
        }
        moves
    }

    // ==================== Initial population ====================

    /// Fill every empty cell with a uniform-random color from the first
    /// `palette_size` colors.
    pub fn fill_random_with<R: Rng>(&mut self, rng: &mut R, palette_size: usize) {
        for pos in self.empty_positions() {
            let color = TileColor::random_with(rng, palette_size);
            self.spawn(pos, color);
        }
    }

    /// Fill every empty cell, re-rolling any color that would complete a
    /// horizontal or vertical run of [`MIN_MATCH_RUN`] so a fresh board has
    /// no pre-made matches. With fewer than 3 colors a clean fill may be
    /// impossible, so this falls back to plain random filling.
    pub fn fill_without_matches_with<R: Rng>(&mut self, rng: &mut R, palette_size: usize) {
        if palette_size < MIN_MATCH_RUN {
            self.fill_random_with(rng, palette_size);
            return;
        }
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = GridPos::new(x, y);
                if !self.is_empty(pos) {
                    continue;
                }
                let color = loop {
                    let candidate = TileColor::random_with(rng, palette_size);
                    if !self.would_complete_run(pos, candidate) {
                        break candidate;
                    }
                };
                self.spawn(pos, color);
            }
        }
    }

    /// Would placing `color` at `pos` complete a run of 3 with the two cells
    /// to the west or the two cells to the south? Cells are filled west-to-
    /// east, bottom-to-top, so checking behind is sufficient.
    fn would_complete_run(&self, pos: GridPos, color: TileColor) -> bool {
        let same = |p: GridPos| self.get(p).is_some_and(|t| t.matchable && t.color == color);
        (same(pos.offset(-1, 0)) && same(pos.offset(-2, 0)))
            || (same(pos.offset(0, -1)) && same(pos.offset(0, -2)))
    }
}

impl std::fmt::Display for Grid {
    /// Renders the board with the top row first, `_` for empty cells.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Grid {}x{}:", self.width, self.height)?;
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                match self.get(GridPos::new(x, y)) {
                    Some(tile) => write!(f, "{} ", tile.color.initial())?,
                    None => write!(f, "_ ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
