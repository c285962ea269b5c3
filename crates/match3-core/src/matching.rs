//! Match detection over the board, polymorphic over match-shape strategies.
//!
//! The detector aggregates any number of [`MatchStrategy`] implementations
//! and unions their results with set semantics, so a tile qualifying through
//! several strategies (or both axes of one) is reported once. Only the line
//! strategy ships today; L/T-shape or color-bomb strategies slot in through
//! [`MatchDetector::add_strategy`] without touching the aggregation logic.

use crate::config::MIN_MATCH_RUN;
use crate::grid::Grid;
use crate::tile::{GridPos, Tile, TileId};
use std::collections::HashSet;

/// A single match-shape rule.
pub trait MatchStrategy {
    /// Human-readable name for diagnostics
    fn name(&self) -> &'static str;

    /// Whether any qualifying match runs through `seed`
    fn has_match(&self, seed: &Tile, grid: &Grid) -> bool;

    /// All tiles forming a qualifying match through `seed`
    fn find_matches(&self, seed: &Tile, grid: &Grid) -> HashSet<TileId>;
}

/// Runs of `MIN_MATCH_RUN` or more same-color tiles along a row or column.
#[derive(Debug, Default)]
pub struct LineMatchStrategy;

impl LineMatchStrategy {
    /// Count matching tiles walking from the seed in one direction,
    /// stopping at the first empty, unmatchable, or differently-colored
    /// cell. Out-of-bounds reads come back empty, so the walk needs no
    /// explicit edge check.
    fn run_length(&self, seed: &Tile, grid: &Grid, dx: i32, dy: i32) -> usize {
        let mut count = 0;
        let mut pos = seed.pos.offset(dx, dy);
        while let Some(tile) = grid.get(pos) {
            if !tile.can_match_with(seed) {
                break;
            }
            count += 1;
            pos = pos.offset(dx, dy);
        }
        count
    }

    fn collect_run(
        &self,
        seed: &Tile,
        grid: &Grid,
        dx: i32,
        dy: i32,
        out: &mut Vec<GridPos>,
    ) {
        let mut pos = seed.pos.offset(dx, dy);
        while let Some(tile) = grid.get(pos) {
            if !tile.can_match_with(seed) {
                break;
            }
            out.push(pos);
            pos = pos.offset(dx, dy);
        }
    }

    /// The seed plus its run along one axis (two opposite directions)
    fn axis_run(&self, seed: &Tile, grid: &Grid, dx: i32, dy: i32) -> Vec<GridPos> {
        let mut run = vec![seed.pos];
        self.collect_run(seed, grid, dx, dy, &mut run);
        self.collect_run(seed, grid, -dx, -dy, &mut run);
        run
    }
}

impl MatchStrategy for LineMatchStrategy {
    fn name(&self) -> &'static str {
        "Line Match (3+)"
    }

    fn has_match(&self, seed: &Tile, grid: &Grid) -> bool {
        if !seed.matchable {
            return false;
        }
        let horizontal = self.run_length(seed, grid, 1, 0) + self.run_length(seed, grid, -1, 0) + 1;
        if horizontal >= MIN_MATCH_RUN {
            return true;
        }
        let vertical = self.run_length(seed, grid, 0, 1) + self.run_length(seed, grid, 0, -1) + 1;
        vertical >= MIN_MATCH_RUN
    }

    fn find_matches(&self, seed: &Tile, grid: &Grid) -> HashSet<TileId> {
        let mut matches = HashSet::new();
        if !seed.matchable {
            return matches;
        }
        for (dx, dy) in [(1, 0), (0, 1)] {
            let run = self.axis_run(seed, grid, dx, dy);
            if run.len() >= MIN_MATCH_RUN {
                for pos in run {
                    if let Some(tile) = grid.get(pos) {
                        matches.insert(tile.id);
                    }
                }
            }
        }
        matches
    }
}

/// Aggregates match strategies and unions their results.
pub struct MatchDetector {
    strategies: Vec<Box<dyn MatchStrategy>>,
}

impl Default for MatchDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchDetector {
    /// Detector with the standard line strategy registered
    pub fn new() -> Self {
        Self {
            strategies: vec![Box::new(LineMatchStrategy)],
        }
    }

    /// Detector with no strategies; callers register their own
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Register an additional match-shape strategy
    pub fn add_strategy(&mut self, strategy: Box<dyn MatchStrategy>) {
        self.strategies.push(strategy);
    }

    /// Names of the registered strategies, for diagnostics
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Whether any registered strategy finds a qualifying match through the
    /// tile at `seed`. Empty and out-of-bounds seeds are a silent no-match.
    pub fn has_match(&self, seed: GridPos, grid: &Grid) -> bool {
        match grid.get(seed) {
            Some(tile) => self.strategies.iter().any(|s| s.has_match(tile, grid)),
            None => false,
        }
    }

    /// Deduplicated union of all strategies' matches through `seed`
    pub fn find_matches(&self, seed: GridPos, grid: &Grid) -> HashSet<TileId> {
        let mut matches = HashSet::new();
        if let Some(tile) = grid.get(seed) {
            for strategy in &self.strategies {
                matches.extend(strategy.find_matches(tile, grid));
            }
        }
        matches
    }

    /// Scan every occupied cell and union its matches. Used for cascade
    /// detection after gravity.
    pub fn find_all_matches(&self, grid: &Grid) -> HashSet<TileId> {
        let mut matches = HashSet::new();
        for x in 0..grid.width() {
            for y in 0..grid.height() {
                let pos = GridPos::new(x, y);
                if grid.get(pos).is_some() {
                    matches.extend(self.find_matches(pos, grid));
                }
            }
        }
        matches
    }
}
