//! # Hexdice Development Tools
//!
//! Command-line tools for development:
//! - Map generation with ASCII preview or RON/JSON export
//! - Parallel batch generation with aggregate statistics
//! - Determinism verification per seed
//! - Invariant validation of saved maps

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod batch;
pub mod error;
pub mod io;
pub mod render;
pub mod validate;
