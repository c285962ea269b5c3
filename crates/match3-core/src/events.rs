//! Notifications the core emits for external consumption.
//!
//! The engine and state machine return these from their operations instead
//! of firing callbacks through a global bus; the composition root decides
//! who listens (view, audio, score, UI). Nothing in the core depends on a
//! consumer existing.

use crate::state::{GameState, TransitionSource};
use crate::tile::{GridPos, TileColor, TileId};
use serde::{Deserialize, Serialize};

/// Why a tile moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    /// Player-driven swap (or its revert)
    Swap,
    /// Gravity compaction after a destroy
    Fall,
    /// A freshly spawned tile dropping in from above the board
    RefillDrop,
}

/// A single notification from the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardEvent {
    /// A matched tile is about to be removed; `pos` is its former cell.
    TileDestroyed { pos: GridPos, color: TileColor },

    /// A tile changed cells. For `RefillDrop`, `from` is the spawn row
    /// above the board the fall-in animation starts at.
    TileMoved {
        id: TileId,
        from: GridPos,
        to: GridPos,
        kind: MoveKind,
    },

    /// A new tile was created during refill.
    TileSpawned {
        id: TileId,
        pos: GridPos,
        color: TileColor,
    },

    /// A match of `count` tiles was found and will be destroyed.
    MatchFound { count: usize },

    /// A swap request was rejected or produced no match (feedback
    /// sound/shake hook); the board is unchanged or reverted.
    InvalidMove,

    /// A committed game-state transition.
    StateChanged {
        previous: GameState,
        current: GameState,
        source: TransitionSource,
        input_allowed: bool,
    },

    /// First entry into `Ready` — raised exactly once per lifecycle.
    GameStarted,
}
