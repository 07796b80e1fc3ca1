//! snake-core: Snake game model
//!
//! Grid simulation, scoring and high-score persistence with no platform
//! dependencies. Rendering and timing live in the front ends.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod error;
pub mod game;
pub mod grid;
pub mod store;

// Re-exports
pub use error::{Error, Result};
pub use game::{Game, GameConfig, GameState, TickOutcome};
pub use grid::{Cell, Direction, Grid};
pub use store::{parse_score, HighScoreStore, MemoryStore, HIGH_SCORE_KEY};
