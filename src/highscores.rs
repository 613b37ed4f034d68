//! Best score across sessions
//!
//! Stored as a bare integer string, so a missing or corrupt entry simply
//! reads as 0.

use std::io;

use crate::consts::HIGH_SCORE_KEY;
use crate::persistence::Storage;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScore {
    best: u64,
}

impl HighScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Whether `score` would replace the current best
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.best
    }

    /// Keep `score` if it beats the best; returns true on a new best
    pub fn record(&mut self, score: u64) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.best = score;
        true
    }

    pub fn load(storage: &dyn Storage) -> Self {
        let best = match storage.get_item(HIGH_SCORE_KEY) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Unreadable high score '{}', starting from 0", raw);
                0
            }),
            None => 0,
        };
        log::info!("High score: {}", best);
        Self { best }
    }

    pub fn save(&self, storage: &mut dyn Storage) -> io::Result<()> {
        storage.set_item(HIGH_SCORE_KEY, &self.best.to_string())
    }

    /// Record a finished session's score and persist a new best
    pub fn submit(&mut self, score: u64, storage: &mut dyn Storage) -> bool {
        if !self.record(score) {
            return false;
        }
        log::info!("New high score: {}", score);
        if let Err(e) = self.save(storage) {
            log::warn!("Failed to save high score: {}", e);
        }
        true
    }
}
