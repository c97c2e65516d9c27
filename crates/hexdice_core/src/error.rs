//! Error types for map generation and connectivity analysis.

use thiserror::Error;

use crate::player::PlayerId;
use crate::territory::TerritoryId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for the map engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Map configuration rejected at call time.
    #[error("Invalid map configuration: {0}")]
    InvalidConfig(String),

    /// A single territory could not reach the minimum growth size.
    ///
    /// Recoverable: the assembler discards the seed and tries the next one.
    #[error("Territory {territory} could not grow from cell {seed}: reached {reached} of {required} cells")]
    GrowthFailure {
        /// Territory id that was being grown.
        territory: TerritoryId,
        /// Seed cell the growth started from.
        seed: usize,
        /// Cells claimed before rollback.
        reached: usize,
        /// Minimum number of cells required.
        required: usize,
    },

    /// No usable map could be assembled.
    #[error("Map generation failed after {attempts} attempt(s): {reason}")]
    GenerationFailure {
        /// Number of attempts made.
        attempts: u32,
        /// Why the last attempt was rejected.
        reason: String,
    },

    /// Border tracing did not return to its start within the step bound.
    #[error("Border trace of territory {territory} exceeded {limit} steps")]
    BoundaryTraceOverrun {
        /// Territory being traced.
        territory: TerritoryId,
        /// Step bound that was exceeded.
        limit: usize,
    },

    /// Player id outside `0..player_count`.
    #[error("Unknown player {player} (player count {player_count})")]
    UnknownPlayer {
        /// Offending player id.
        player: PlayerId,
        /// Number of players in the game.
        player_count: usize,
    },

    /// Territory id that does not name an existing territory.
    #[error("Unknown territory {0}")]
    UnknownTerritory(TerritoryId),

    /// Dice count outside the allowed range.
    #[error("Invalid dice count {dice} for territory {territory}: must be between 1 and 8")]
    InvalidDiceCount {
        /// Territory the dice were assigned to.
        territory: TerritoryId,
        /// Rejected dice count.
        dice: u8,
    },
}

impl GameError {
    /// Whether retrying with fresh randomness can clear this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::GrowthFailure { .. } | Self::GenerationFailure { .. }
        )
    }
}
