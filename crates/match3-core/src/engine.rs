//! Turn resolution: swap -> match -> destroy -> gravity -> cascade -> refill.
//!
//! The engine owns the board, the detector, and the lifecycle state machine,
//! and advances through explicit phases. Each phase's board mutation happens
//! when the phase is entered; the engine then suspends until the external
//! presentation layer acknowledges the phase with
//! [`BoardEngine::phase_complete`] (the "animation done" synchronization
//! point). Headless callers acknowledge immediately — the whole cascade
//! resolves deterministically with no timing involved.
//!
//! At most one swap transaction is in flight: requests while the engine is
//! not idle are rejected, never queued.

use crate::config::{BoardConfig, ConfigError, MAX_CASCADE_PASSES};
use crate::events::{BoardEvent, MoveKind};
use crate::grid::Grid;
use crate::matching::MatchDetector;
use crate::state::{GameState, GameStateMachine, TransitionSource};
use crate::tile::{GridPos, TileColor, TileId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, error, warn};

/// Where the engine is within a turn. `Idle` accepts a new swap; every
/// other phase waits for an acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Accepting a new swap
    Idle,
    /// The two tiles are trading places
    Swapping,
    /// A no-match swap is sliding back
    Reverting,
    /// Matched tiles are being removed
    Destroying,
    /// Gravity moves are playing out
    Falling,
    /// Deciding between another destroy pass and refill
    CascadeCheck,
    /// New tiles are dropping in from above
    Refilling,
}

/// The authoritative board-state machine for one game.
pub struct BoardEngine {
    config: BoardConfig,
    grid: Grid,
    detector: MatchDetector,
    state: GameStateMachine,
    rng: StdRng,
    phase: Phase,
    /// The two cells of the in-flight swap, in request order
    pending_swap: Option<(GridPos, GridPos)>,
    /// Columns emptied by the latest destroy pass
    affected_columns: BTreeSet<i32>,
    /// Destroy passes within the current turn, checked against the bound
    cascade_passes: u32,
}

impl BoardEngine {
    /// Create an engine seeded from entropy. The board is left empty until
    /// [`BoardEngine::start`] runs the Loading transition.
    pub fn new(config: BoardConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an engine with a caller-provided RNG for deterministic runs.
    pub fn with_rng(config: BoardConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            grid: Grid::new(config.width, config.height),
            detector: MatchDetector::new(),
            state: GameStateMachine::new(),
            rng,
            config,
            phase: Phase::Idle,
            pending_swap: None,
            affected_columns: BTreeSet::new(),
            cascade_passes: 0,
        })
    }

    /// Convenience: deterministic engine from a numeric seed.
    pub fn with_seed(config: BoardConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Run the Booting -> Loading -> Ready lifecycle: populate the board
    /// (no pre-made matches) and open for input. Returns the state
    /// notifications, ending with the one-time game-started signal.
    pub fn start(&mut self) -> Vec<BoardEvent> {
        self.state
            .try_set_state(GameState::Loading, TransitionSource::System);
        self.grid
            .fill_without_matches_with(&mut self.rng, self.config.color_count);
        self.state
            .try_set_state(GameState::Ready, TransitionSource::System);
        self.state.drain_notifications()
    }

    /// Current phase within the turn
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a new swap would currently be accepted
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// The board (read-only; all mutation goes through the engine)
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The lifecycle state machine
    pub fn state(&self) -> &GameStateMachine {
        &self.state
    }

    /// The startup configuration
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Register an extra match-shape strategy on the detector
    pub fn detector_mut(&mut self) -> &mut MatchDetector {
        &mut self.detector
    }

    // ==================== Player input ====================

    /// Attempt a player swap of the tiles at `a` and `b`.
    ///
    /// Preconditions: the engine is idle, the state machine allows input,
    /// both cells hold movable tiles, and the cells are orthogonally
    /// adjacent. Any violation yields a single [`BoardEvent::InvalidMove`]
    /// with the board untouched — an expected user-facing outcome, not an
    /// error.
    ///
    /// On success the swap is applied, the engine enters
    /// [`Phase::Swapping`], and the state machine locks input. The outcome
    /// (commit or revert) is decided when the swap phase is acknowledged.
    pub fn attempt_swap(&mut self, a: GridPos, b: GridPos) -> Vec<BoardEvent> {
        if !self.is_idle() {
            debug!(%a, %b, phase = ?self.phase, "swap rejected: engine busy");
            return vec![BoardEvent::InvalidMove];
        }
        if !self.state.is_player_input_allowed() {
            debug!(%a, %b, state = ?self.state.current(), "swap rejected: input not allowed");
            return vec![BoardEvent::InvalidMove];
        }
        let (tile_a, tile_b) = match (self.grid.get(a), self.grid.get(b)) {
            (Some(ta), Some(tb)) => (ta, tb),
            _ => {
                debug!(%a, %b, "swap rejected: empty or out-of-bounds cell");
                return vec![BoardEvent::InvalidMove];
            }
        };
        if !tile_a.is_neighbor(tile_b) {
            debug!(%a, %b, "swap rejected: cells not adjacent");
            return vec![BoardEvent::InvalidMove];
        }
        if !tile_a.movable || !tile_b.movable {
            debug!(%a, %b, "swap rejected: immovable tile");
            return vec![BoardEvent::InvalidMove];
        }

        let (id_a, id_b) = (tile_a.id, tile_b.id);
        self.grid.swap(a, b);
        self.pending_swap = Some((a, b));
        self.cascade_passes = 0;
        self.phase = Phase::Swapping;
        self.state
            .try_set_state(GameState::Processing, TransitionSource::Gameplay);

        let mut events = self.state.drain_notifications();
        events.push(BoardEvent::TileMoved {
            id: id_a,
            from: a,
            to: b,
            kind: MoveKind::Swap,
        });
        events.push(BoardEvent::TileMoved {
            id: id_b,
            from: b,
            to: a,
            kind: MoveKind::Swap,
        });
        events
    }

    // ==================== Phase advancement ====================

    /// Acknowledge that the presentation of `phase` finished, advancing the
    /// engine. Acknowledgements for a phase other than the current one are
    /// logged and ignored, as is an acknowledgement while idle.
    pub fn phase_complete(&mut self, phase: Phase) -> Vec<BoardEvent> {
        if phase != self.phase {
            warn!(acknowledged = ?phase, current = ?self.phase, "phase acknowledgement mismatch");
            return Vec::new();
        }
        match self.phase {
            Phase::Idle => {
                warn!("phase acknowledgement while idle");
                Vec::new()
            }
            Phase::Swapping => self.evaluate_swap(),
            Phase::Reverting => self.finish_turn(),
            Phase::Destroying => self.run_gravity(),
            Phase::Falling => {
                self.phase = Phase::CascadeCheck;
                Vec::new()
            }
            Phase::CascadeCheck => self.cascade_or_refill(),
            Phase::Refilling => self.finish_turn(),
        }
    }

    /// Decide the swap outcome: commit into a destroy pass, or revert.
    fn evaluate_swap(&mut self) -> Vec<BoardEvent> {
        let (a, b) = match self.pending_swap {
            Some(pair) => pair,
            None => {
                // Unreachable through the public API; a Swapping phase
                // always has a recorded pair.
                panic!("swap phase with no pending swap");
            }
        };
        let matched_a = self.detector.has_match(a, &self.grid);
        let matched_b = self.detector.has_match(b, &self.grid);

        if !matched_a && !matched_b {
            // The one allowed rollback: undo the swap and report it as an
            // invalid (no-match) move.
            let id_at_a = self.grid.get(a).map(|t| t.id);
            let id_at_b = self.grid.get(b).map(|t| t.id);
            self.grid.swap(a, b);
            self.phase = Phase::Reverting;

            let mut events = vec![BoardEvent::InvalidMove];
            if let Some(id) = id_at_a {
                events.push(BoardEvent::TileMoved {
                    id,
                    from: a,
                    to: b,
                    kind: MoveKind::Swap,
                });
            }
            if let Some(id) = id_at_b {
                events.push(BoardEvent::TileMoved {
                    id,
                    from: b,
                    to: a,
                    kind: MoveKind::Swap,
                });
            }
            return events;
        }

        let mut matched: HashSet<TileId> = self.detector.find_matches(a, &self.grid);
        matched.extend(self.detector.find_matches(b, &self.grid));
        // has_match and find_matches disagreeing is a strategy bug; fail
        // fast rather than resolve a phantom turn.
        assert!(
            !matched.is_empty(),
            "detector reported a match but produced an empty match set"
        );
        self.pending_swap = None;
        self.destroy(matched)
    }

    /// Remove a matched set from the board, recording affected columns.
    fn destroy(&mut self, matched: HashSet<TileId>) -> Vec<BoardEvent> {
        self.cascade_passes += 1;
        self.affected_columns.clear();

        // Sorted by cell for a deterministic event order
        let mut doomed: Vec<GridPos> = matched
            .iter()
            .filter_map(|&id| self.grid.position_of(id))
            .collect();
        doomed.sort_by_key(|p| (p.x, p.y));

        let mut events = vec![BoardEvent::MatchFound {
            count: doomed.len(),
        }];
        for pos in doomed {
            if let Some(tile) = self.grid.remove(pos) {
                events.push(BoardEvent::TileDestroyed {
                    pos,
                    color: tile.color,
                });
                self.affected_columns.insert(pos.x);
            }
        }
        debug!(
            destroyed = events.len() - 1,
            columns = ?self.affected_columns,
            pass = self.cascade_passes,
            "destroy pass"
        );
        self.phase = Phase::Destroying;
        events
    }

    /// Compact only the columns the destroy pass touched.
    fn run_gravity(&mut self) -> Vec<BoardEvent> {
        let columns: Vec<i32> = self.affected_columns.iter().copied().collect();
        let mut events = Vec::new();
        for x in columns {
            for mv in self.grid.apply_gravity_column(x) {
                events.push(BoardEvent::TileMoved {
                    id: mv.id,
                    from: mv.from,
                    to: mv.to,
                    kind: MoveKind::Fall,
                });
            }
        }
        self.phase = Phase::Falling;
        events
    }

    /// Whole-board cascade detection; loop back into a destroy pass or
    /// move on to refill.
    fn cascade_or_refill(&mut self) -> Vec<BoardEvent> {
        let cascades = self.detector.find_all_matches(&self.grid);
        if !cascades.is_empty() {
            if self.cascade_passes >= MAX_CASCADE_PASSES {
                error!(
                    passes = self.cascade_passes,
                    "cascade pass bound hit; forcing refill"
                );
            } else {
                return self.destroy(cascades);
            }
        }
        self.refill()
    }

    /// Spawn uniform-random tiles into every remaining gap. Spawn rows sit
    /// above the board, staggered per column, so the fall-in animation has
    /// a starting point.
    fn refill(&mut self) -> Vec<BoardEvent> {
        let mut events = Vec::new();
        for x in 0..self.grid.width() {
            // Topmost gap is filled first, walking downward
            let gaps: Vec<i32> = (0..self.grid.height())
                .rev()
                .filter(|&y| self.grid.is_empty(GridPos::new(x, y)))
                .collect();

            for (i, y) in gaps.into_iter().enumerate() {
                let pos = GridPos::new(x, y);
                let color = TileColor::random_with(&mut self.rng, self.config.color_count);
                let id = match self.grid.spawn(pos, color) {
                    Some(id) => id,
                    None => continue,
                };
                let spawn_row = GridPos::new(x, self.grid.height() + i as i32);
                events.push(BoardEvent::TileSpawned { id, pos, color });
                events.push(BoardEvent::TileMoved {
                    id,
                    from: spawn_row,
                    to: pos,
                    kind: MoveKind::RefillDrop,
                });
            }
        }
        self.phase = Phase::Refilling;
        events
    }

    /// Return to idle and reopen input.
    fn finish_turn(&mut self) -> Vec<BoardEvent> {
        self.pending_swap = None;
        self.affected_columns.clear();
        self.phase = Phase::Idle;
        self.state
            .try_set_state(GameState::Ready, TransitionSource::Gameplay);
        self.state.drain_notifications()
    }

    // ==================== Pass-throughs ====================

    /// Pause the game (UI hook). Events carry the transition notification.
    pub fn try_pause(&mut self, source: TransitionSource) -> (bool, Vec<BoardEvent>) {
        let ok = self.state.try_pause(source);
        (ok, self.state.drain_notifications())
    }

    /// Resume from pause.
    pub fn try_resume(&mut self, source: TransitionSource) -> (bool, Vec<BoardEvent>) {
        let ok = self.state.try_resume(source);
        (ok, self.state.drain_notifications())
    }

    /// End the game. Legal from any gameplay state.
    pub fn game_over(&mut self, source: TransitionSource) -> (bool, Vec<BoardEvent>) {
        let ok = self.state.try_set_state(GameState::GameOver, source);
        (ok, self.state.drain_notifications())
    }

    // ==================== Headless helpers ====================

    /// Acknowledge phases until the engine is idle again, collecting every
    /// event along the way. For tests and headless drivers that have no
    /// animations to wait for.
    pub fn resolve_to_idle(&mut self) -> Vec<BoardEvent> {
        let mut events = Vec::new();
        // Generous bound: each destroy pass takes a fixed number of
        // acknowledgements, and passes themselves are bounded.
        let mut budget = (MAX_CASCADE_PASSES as usize + 2) * 8;
        while !self.is_idle() && budget > 0 {
            events.extend(self.phase_complete(self.phase));
            budget -= 1;
        }
        assert!(self.is_idle(), "engine failed to settle within budget");
        events
    }

    /// A uniformly random pair of adjacent in-bounds cells, for drivers.
    pub fn random_adjacent_pair(&mut self) -> (GridPos, GridPos) {
        let a = GridPos::new(
            self.rng.gen_range(0..self.grid.width()),
            self.rng.gen_range(0..self.grid.height()),
        );
        let neighbors = a.orthogonal_neighbors();
        let mut b = neighbors[self.rng.gen_range(0..neighbors.len())];
        if !self.grid.is_valid_position(b) {
            // Mirror back inside; the mirrored cell is adjacent too
            b = GridPos::new(
                b.x.clamp(0, self.grid.width() - 1),
                b.y.clamp(0, self.grid.height() - 1),
            );
            if b == a {
                b = if a.x > 0 { a.offset(-1, 0) } else { a.offset(1, 0) };
            }
        }
        (a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn started_engine(seed: u64) -> BoardEngine {
        let mut engine = BoardEngine::with_seed(BoardConfig::default(), seed).unwrap();
        let events = engine.start();
        assert!(events.contains(&BoardEvent::GameStarted));
        engine
    }

    /// Rebuild the board into a known layout (ignores spawn randomness).
    fn set_board(engine: &mut BoardEngine, rows: &[&str]) {
        let height = engine.grid.height();
        engine.grid.clear();
        for (row_idx, row) in rows.iter().enumerate() {
            let y = height - 1 - row_idx as i32;
            for (x, ch) in row.chars().enumerate() {
                let color = match ch {
                    'R' => TileColor::Red,
                    'B' => TileColor::Blue,
                    'G' => TileColor::Green,
                    'Y' => TileColor::Yellow,
                    'P' => TileColor::Purple,
                    'O' => TileColor::Orange,
                    '_' => continue,
                    other => panic!("unknown cell {other:?}"),
                };
                engine.grid.spawn(GridPos::new(x as i32, y), color);
            }
        }
    }

    /// 8 rows with no matches anywhere and none possible in column overlap
    const STABLE_BOARD: [&str; 8] = [
        "BGYPOBGY",
        "GYPOBGYP",
        "YPOBGYPO",
        "POBGYPOB",
        "OBGYPOBG",
        "BGYPOBGY",
        "GYPOBGYP",
        "YPOBGYPO",
    ];

    #[test]
    fn test_start_fills_board_and_opens_input() {
        let mut engine = BoardEngine::with_seed(BoardConfig::default(), 7).unwrap();
        assert!(!engine.state().is_player_input_allowed());

        let events = engine.start();
        assert!(engine.grid().is_full());
        assert!(engine.state().is_player_input_allowed());
        assert_eq!(engine.state().current(), GameState::Ready);
        assert!(events.iter().any(|e| matches!(
            e,
            BoardEvent::StateChanged {
                current: GameState::Ready,
                ..
            }
        )));
        // A fresh board never opens with a pre-made match
        assert!(engine.detector.find_all_matches(engine.grid()).is_empty());
    }

    #[test]
    fn test_swap_rejected_before_start() {
        let mut engine = BoardEngine::with_seed(BoardConfig::default(), 7).unwrap();
        let events = engine.attempt_swap(GridPos::new(0, 0), GridPos::new(1, 0));
        assert_eq!(events, vec![BoardEvent::InvalidMove]);
        assert!(engine.is_idle());
    }

    #[test]
    fn test_swap_rejected_when_not_adjacent() {
        let mut engine = started_engine(7);
        for (a, b) in [
            (GridPos::new(0, 0), GridPos::new(2, 0)), // distance 2
            (GridPos::new(0, 0), GridPos::new(1, 1)), // diagonal
            (GridPos::new(3, 3), GridPos::new(3, 3)), // same cell
        ] {
            let events = engine.attempt_swap(a, b);
            assert_eq!(events, vec![BoardEvent::InvalidMove]);
            assert!(engine.is_idle());
            assert_eq!(engine.state().current(), GameState::Ready);
        }
    }

    #[test]
    fn test_swap_rejected_out_of_bounds() {
        let mut engine = started_engine(7);
        let events = engine.attempt_swap(GridPos::new(-1, 0), GridPos::new(0, 0));
        assert_eq!(events, vec![BoardEvent::InvalidMove]);
    }

    #[test]
    fn test_no_match_swap_reverts() {
        let mut engine = started_engine(7);
        set_board(&mut engine, &STABLE_BOARD);

        let a = GridPos::new(3, 3);
        let b = GridPos::new(3, 4);
        let before_a = engine.grid().get(a).unwrap().id;
        let before_b = engine.grid().get(b).unwrap().id;

        let events = engine.attempt_swap(a, b);
        assert_eq!(engine.phase(), Phase::Swapping);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, BoardEvent::TileMoved { .. }))
                .count(),
            2
        );
        // Input locked during resolution
        assert!(!engine.state().is_player_input_allowed());

        let events = engine.phase_complete(Phase::Swapping);
        assert_eq!(engine.phase(), Phase::Reverting);
        assert!(events.contains(&BoardEvent::InvalidMove));

        let events = engine.phase_complete(Phase::Reverting);
        assert!(engine.is_idle());
        assert_eq!(engine.state().current(), GameState::Ready);
        assert!(events.iter().any(|e| matches!(
            e,
            BoardEvent::StateChanged {
                current: GameState::Ready,
                ..
            }
        )));

        // Board is exactly as before the swap
        assert_eq!(engine.grid().get(a).unwrap().id, before_a);
        assert_eq!(engine.grid().get(b).unwrap().id, before_b);
    }

    #[test]
    fn test_matching_swap_commits_and_refills() {
        let mut engine = started_engine(7);
        let mut rows = STABLE_BOARD;
        // Bottom row: red pair with a third red one swap away
        rows[7] = "RR_ROBGY";
        set_board(&mut engine, &rows);
        engine.grid.spawn(GridPos::new(2, 1), TileColor::Red);
        engine.grid.spawn(GridPos::new(2, 0), TileColor::Blue);

        // Swapping (2,1) down into (2,0) completes R R R at the bottom row
        let events = engine.attempt_swap(GridPos::new(2, 1), GridPos::new(2, 0));
        assert_eq!(engine.phase(), Phase::Swapping);
        assert!(!events.contains(&BoardEvent::InvalidMove));

        let events = engine.phase_complete(Phase::Swapping);
        assert_eq!(engine.phase(), Phase::Destroying);
        assert!(events.contains(&BoardEvent::MatchFound { count: 4 }));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, BoardEvent::TileDestroyed { .. }))
                .count(),
            4
        );

        let fall_events = engine.phase_complete(Phase::Destroying);
        assert_eq!(engine.phase(), Phase::Falling);
        assert!(fall_events
            .iter()
            .all(|e| matches!(e, BoardEvent::TileMoved { kind: MoveKind::Fall, .. })));

        assert!(engine.phase_complete(Phase::Falling).is_empty());
        assert_eq!(engine.phase(), Phase::CascadeCheck);

        let refill_events = engine.phase_complete(Phase::CascadeCheck);
        assert_eq!(engine.phase(), Phase::Refilling);
        let spawned = refill_events
            .iter()
            .filter(|e| matches!(e, BoardEvent::TileSpawned { .. }))
            .count();
        assert_eq!(spawned, 4, "every destroyed tile is replaced");
        assert!(engine.grid().is_full());

        engine.phase_complete(Phase::Refilling);
        assert!(engine.is_idle());
        assert!(engine.state().is_player_input_allowed());
    }

    #[test]
    fn test_swap_rejected_while_resolving() {
        let mut engine = started_engine(7);
        set_board(&mut engine, &STABLE_BOARD);
        engine.attempt_swap(GridPos::new(0, 0), GridPos::new(1, 0));
        assert_eq!(engine.phase(), Phase::Swapping);

        // Second request is rejected, not queued
        let events = engine.attempt_swap(GridPos::new(4, 4), GridPos::new(4, 5));
        assert_eq!(events, vec![BoardEvent::InvalidMove]);
        assert_eq!(engine.phase(), Phase::Swapping);
    }

    #[test]
    fn test_phase_acknowledgement_mismatch_ignored() {
        let mut engine = started_engine(7);
        set_board(&mut engine, &STABLE_BOARD);
        engine.attempt_swap(GridPos::new(0, 0), GridPos::new(1, 0));

        assert!(engine.phase_complete(Phase::Falling).is_empty());
        assert_eq!(engine.phase(), Phase::Swapping);

        // And while idle nothing advances either
        let mut idle_engine = started_engine(8);
        assert!(idle_engine.phase_complete(Phase::Idle).is_empty());
        assert!(idle_engine.is_idle());
    }

    #[test]
    fn test_single_destroy_column_scenario() {
        // Destroying one tile at (2,5) on a full 8-row board: every tile in
        // the column above moves down one, and one tile spawns at the top.
        let mut engine = started_engine(7);
        set_board(&mut engine, &STABLE_BOARD);

        let above_before: Vec<TileId> = (6..8)
            .map(|y| engine.grid().get(GridPos::new(2, y)).unwrap().id)
            .collect();

        let mut doomed = HashSet::new();
        doomed.insert(engine.grid().get(GridPos::new(2, 5)).unwrap().id);
        let events = engine.destroy(doomed);
        assert!(events.contains(&BoardEvent::MatchFound { count: 1 }));

        let fall_events = engine.phase_complete(Phase::Destroying);
        let falls: Vec<_> = fall_events
            .iter()
            .filter_map(|e| match e {
                BoardEvent::TileMoved {
                    id, from, to, kind: MoveKind::Fall,
                } => Some((*id, *from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(falls.len(), 2);
        for (id, from, to) in &falls {
            assert_eq!(from.x, 2);
            assert_eq!(to.y, from.y - 1, "each tile above falls exactly one row");
            assert!(above_before.contains(id));
        }

        engine.phase_complete(Phase::Falling);
        let refill_events = engine.phase_complete(Phase::CascadeCheck);
        let spawns: Vec<_> = refill_events
            .iter()
            .filter_map(|e| match e {
                BoardEvent::TileSpawned { pos, .. } => Some(*pos),
                _ => None,
            })
            .collect();
        assert_eq!(spawns, vec![GridPos::new(2, 7)]);
    }

    #[test]
    fn test_cascade_terminates_and_board_refills() {
        // Random boards, random swaps: every accepted swap must settle back
        // to a full, idle board within the pass bound.
        for seed in 0..20 {
            let mut engine = started_engine(seed);
            for _ in 0..30 {
                let (a, b) = engine.random_adjacent_pair();
                engine.attempt_swap(a, b);
                engine.resolve_to_idle();
                assert!(engine.grid().is_full(), "seed {seed}");
                assert!(engine.is_idle());
                assert_eq!(engine.state().current(), GameState::Ready);
            }
        }
    }

    #[test]
    fn test_gravity_restricted_to_affected_columns() {
        let mut engine = started_engine(7);
        set_board(&mut engine, &STABLE_BOARD);

        // Leave holes in columns 0 and 5 below occupied cells, then destroy
        // a tile only in column 2: the holes must survive gravity.
        engine.grid.remove(GridPos::new(0, 3));
        engine.grid.remove(GridPos::new(5, 2));

        let mut doomed = HashSet::new();
        doomed.insert(engine.grid().get(GridPos::new(2, 2)).unwrap().id);
        engine.destroy(doomed);
        engine.phase_complete(Phase::Destroying);

        assert!(engine.grid().is_empty(GridPos::new(0, 3)));
        assert!(engine.grid().is_empty(GridPos::new(5, 2)));
        // Column 2 compacted
        assert!(engine.grid().is_empty(GridPos::new(2, 7)));
    }

    #[test]
    fn test_pause_blocks_swaps() {
        let mut engine = started_engine(7);
        let (ok, events) = engine.try_pause(TransitionSource::UserInterface);
        assert!(ok);
        assert!(events.iter().any(|e| matches!(
            e,
            BoardEvent::StateChanged {
                current: GameState::Paused,
                input_allowed: false,
                ..
            }
        )));

        let events = engine.attempt_swap(GridPos::new(0, 0), GridPos::new(1, 0));
        assert_eq!(events, vec![BoardEvent::InvalidMove]);

        let (ok, _) = engine.try_resume(TransitionSource::UserInterface);
        assert!(ok);
        assert!(engine.state().is_player_input_allowed());
    }

    #[test]
    fn test_game_over_locks_engine() {
        let mut engine = started_engine(7);
        let (ok, _) = engine.game_over(TransitionSource::Gameplay);
        assert!(ok);
        let events = engine.attempt_swap(GridPos::new(0, 0), GridPos::new(1, 0));
        assert_eq!(events, vec![BoardEvent::InvalidMove]);
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(BoardEngine::with_seed(BoardConfig::new(0, 8, 6), 1).is_err());
        assert!(BoardEngine::with_seed(BoardConfig::new(8, 8, 9), 1).is_err());
    }
}
