//! Error types for snake-core

use thiserror::Error;

/// Result type alias for game operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the game model
#[derive(Debug, Error)]
pub enum Error {
    /// Backing storage unavailable or failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored high score is not a number
    #[error("Invalid score: {0}")]
    InvalidScore(String),
}
