//! Pausable one-shot countdowns
//!
//! Timers only advance when the simulation ticks them, so a paused session
//! resumes every countdown exactly where it stopped. Owners hold them as
//! `Option<Timer>`: replacing the option removes the previous timer, which
//! keeps at most one pending callback per slot.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    duration: f32,
    remaining: f32,
}

impl Timer {
    pub fn new(duration: f32) -> Self {
        let duration = duration.max(0.0);
        Self {
            duration,
            remaining: duration,
        }
    }

    /// Advance by `dt`; returns true on the tick the countdown reaches zero
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.remaining <= 0.0 {
            return true;
        }
        self.remaining -= dt;
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Completed fraction in 0..=1
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (1.0 - self.remaining / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Tick an optional timer slot; clears the slot and returns true when it fires
pub fn fire(slot: &mut Option<Timer>, dt: f32) -> bool {
    let fired = slot.as_mut().is_some_and(|t| t.tick(dt));
    if fired {
        *slot = None;
    }
    fired
}
