//! High-score persistence
//!
//! The game only needs a single scalar; front ends provide the backing
//! storage (browser local storage, memory for tests).

use crate::{Error, Result};
use std::cell::Cell;
use std::rc::Rc;

/// Storage key of the persisted high score
pub const HIGH_SCORE_KEY: &str = "snakeHighScore";

/// Persistent storage for the high score
pub trait HighScoreStore {
    /// Read the stored high score, `None` when nothing was stored yet
    fn load(&self) -> Result<Option<u32>>;

    /// Persist a new high score
    fn save(&mut self, score: u32) -> Result<()>;
}

/// Parse a stored high-score value
pub fn parse_score(raw: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .map_err(|_| Error::InvalidScore(raw.to_string()))
}

/// In-memory store. Clones share the same slot, so a store handed to one
/// game can be inspected (or handed to the next game) afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<Cell<Option<u32>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a high score
    pub fn with_score(score: u32) -> Self {
        let store = Self::new();
        store.slot.set(Some(score));
        store
    }

    pub fn get(&self) -> Option<u32> {
        self.slot.get()
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<Option<u32>> {
        Ok(self.slot.get())
    }

    fn save(&mut self, score: u32) -> Result<()> {
        self.slot.set(Some(score));
        Ok(())
    }
}
