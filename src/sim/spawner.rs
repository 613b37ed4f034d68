//! Wave spawner: decides when a new enemy walks in
//!
//! One pending countdown at a time. Each expiry is a spawn attempt gated by the
//! difficulty's cap on live enemies, after which the next attempt is scheduled.

use serde::{Deserialize, Serialize};

use super::question::Difficulty;
use super::timer::{Timer, fire};

/// Spawner lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnerState {
    /// Not running (before the first chapter, between chapters, after the run)
    Idle,
    /// Waiting on the countdown to the next attempt
    Scheduled,
    /// Evaluating an attempt; only observable inside `update`
    SpawnAttempt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveSpawner {
    difficulty: Difficulty,
    state: SpawnerState,
    timer: Option<Timer>,
}

impl WaveSpawner {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            state: SpawnerState::Idle,
            timer: None,
        }
    }

    /// Delay before the first attempt of a chapter
    pub fn initial_delay(difficulty: Difficulty, first_chapter: bool) -> f32 {
        match difficulty {
            // Practice polls immediately
            Difficulty::Practice => 0.0,
            Difficulty::Normal if first_chapter => 2.0,
            Difficulty::Normal => 1.5,
            Difficulty::Hard => 0.5,
        }
    }

    /// Delay between attempts
    pub fn interval(&self) -> f32 {
        match self.difficulty {
            Difficulty::Practice => 1.0,
            Difficulty::Normal => 3.0,
            Difficulty::Hard => 1.5,
        }
    }

    /// Whether an attempt with `active` live enemies spawns
    pub fn allows_spawn(&self, active: usize) -> bool {
        match self.difficulty {
            Difficulty::Practice => active == 0,
            Difficulty::Normal => active < 3,
            Difficulty::Hard => true,
        }
    }

    /// (Re)start for a chapter, replacing any pending countdown
    pub fn start(&mut self, first_chapter: bool) {
        let delay = Self::initial_delay(self.difficulty, first_chapter);
        self.timer = Some(Timer::new(delay));
        self.state = SpawnerState::Scheduled;
        log::debug!(
            "{} spawner started, first attempt in {:.1}s",
            self.difficulty.as_str(),
            delay
        );
    }

    /// Cancel the pending countdown
    pub fn stop(&mut self) {
        self.timer = None;
        self.state = SpawnerState::Idle;
    }

    /// Advance the countdown; returns true when an enemy should spawn now.
    ///
    /// Only called while the session is unpaused, so a paused countdown keeps
    /// its remaining time.
    pub fn update(&mut self, dt: f32, active: usize) -> bool {
        if self.state == SpawnerState::Idle || !fire(&mut self.timer, dt) {
            return false;
        }

        self.state = SpawnerState::SpawnAttempt;
        let spawn = self.allows_spawn(active);
        if !spawn {
            log::trace!("Spawn attempt skipped with {} active enemies", active);
        }

        self.timer = Some(Timer::new(self.interval()));
        self.state = SpawnerState::Scheduled;
        spawn
    }

    pub fn state(&self) -> SpawnerState {
        self.state
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Seconds until the next attempt, if one is scheduled
    pub fn time_to_next_attempt(&self) -> Option<f32> {
        self.timer.map(|t| t.remaining())
    }
}
