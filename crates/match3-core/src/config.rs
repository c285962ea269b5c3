//! Board configuration and game-rule constants.

use crate::tile::TileColor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum run length for a line match
pub const MIN_MATCH_RUN: usize = 3;

/// Safety bound on destroy/gravity cascade passes within one turn.
///
/// The loop terminates naturally (each pass removes at least one full run
/// and nothing refills until the cascade settles), but a bound keeps a
/// buggy strategy from spinning forever.
pub const MAX_CASCADE_PASSES: u32 = 32;

/// Startup parameters for a board. Not persisted state; the engine
/// validates this once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Columns
    pub width: i32,
    /// Rows
    pub height: i32,
    /// How many colors from the palette are in play
    pub color_count: usize,
}

impl Default for BoardConfig {
    /// The standard 8x8 board with the full 6-color palette
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
            color_count: TileColor::ALL.len(),
        }
    }
}

/// Errors for invalid board configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("color count must be between 1 and {max}, got {requested}")]
    InvalidColorCount { requested: usize, max: usize },
}

impl BoardConfig {
    /// Create a config; call [`BoardConfig::validate`] before use.
    pub const fn new(width: i32, height: i32, color_count: usize) -> Self {
        Self {
            width,
            height,
            color_count,
        }
    }

    /// Check that the dimensions and palette size are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.color_count == 0 || self.color_count > TileColor::ALL.len() {
            return Err(ConfigError::InvalidColorCount {
                requested: self.color_count,
                max: TileColor::ALL.len(),
            });
        }
        Ok(())
    }
}
