//! # Hexdice Core
//!
//! Territory map generation and connectivity engine for a hex-grid dice
//! strategy game.
//!
//! This crate contains **only** game-state logic:
//! - No rendering
//! - No IO
//! - No system randomness (every random draw comes from an injected RNG)
//!
//! This separation enables:
//! - Seeded, reproducible maps
//! - Headless batch generation
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`hex`] - Offset hex grid and neighbor table
//! - [`percolation`] - Priority-driven territory growth
//! - [`map_generation`] - Full map assembly
//! - [`border`] - Territory outline tracing
//! - [`distribution`] - Ownership assignment
//! - [`dice`] - Dice allocation and reinforcement
//! - [`connectivity`] - Largest connected group per player
//! - [`invariants`] - Structural checks over generated maps

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod border;
pub mod connectivity;
pub mod dice;
pub mod distribution;
pub mod error;
pub mod hex;
pub mod invariants;
pub mod map_generation;
pub mod percolation;
pub mod player;
pub mod territory;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::connectivity::largest_connected_group;
    pub use crate::dice::{DiceAllocation, Reinforcement};
    pub use crate::error::{GameError, Result};
    pub use crate::hex::{Direction, HexGrid};
    pub use crate::invariants::{check_generated, check_invariants, InvariantViolation};
    pub use crate::map_generation::{generate_map, generate_seeded, GeneratedMap, MapConfig};
    pub use crate::player::{Player, PlayerId, PlayerTable};
    pub use crate::territory::{BorderStep, BoundingBox, Territory, TerritoryId, TerritoryTable};
}
