//! Match-3 board engine.
//!
//! This crate provides the deterministic core of a tile-matching game:
//! - Grid storage with swap, neighbor, and bounds queries
//! - Strategy-based match detection (line runs of 3+)
//! - The swap -> match -> destroy -> gravity -> cascade -> refill turn loop
//! - A validating lifecycle state machine gating player input
//! - A notification boundary for view/audio/UI collaborators
//!
//! # Architecture
//!
//! The engine is platform-agnostic and presentation-free: every operation
//! returns the [`BoardEvent`]s it produced, and turn phases advance only
//! when the caller acknowledges them with [`BoardEngine::phase_complete`].
//! A renderer acknowledges when its animation finishes; headless callers
//! (tests, simulations) acknowledge immediately and resolve a full cascade
//! synchronously.
//!
//! # Modules
//!
//! - [`tile`]: Tile entity, colors, positions, adjacency rules
//! - [`grid`]: Board storage and gravity compaction
//! - [`matching`]: Match strategies and the aggregating detector
//! - [`engine`]: Turn resolution state machine
//! - [`state`]: Game lifecycle state machine
//! - [`events`]: Notifications emitted for external consumption
//! - [`config`]: Startup parameters and rule constants

pub mod config;
pub mod engine;
pub mod events;
pub mod grid;
pub mod matching;
pub mod state;
pub mod tile;

// Re-export commonly used types
pub use config::{BoardConfig, ConfigError, MAX_CASCADE_PASSES, MIN_MATCH_RUN};
pub use engine::{BoardEngine, Phase};
pub use events::{BoardEvent, MoveKind};
pub use grid::{GravityMove, Grid};
pub use matching::{LineMatchStrategy, MatchDetector, MatchStrategy};
pub use state::{GameState, GameStateMachine, TransitionSource};
pub use tile::{GridPos, Tile, TileColor, TileId};
