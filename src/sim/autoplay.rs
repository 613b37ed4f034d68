//! Autopilot that plays a session through `TickInput`
//!
//! Used by the headless runner and the integration tests. It only reads the
//! state; everything it does goes through the same input path as a player.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::enemy::EnemyId;
use super::state::GameState;
use super::tick::{InputEvent, TickInput};
use crate::consts::GAME_OVER_LINE_X;

/// Cast the spell once an enemy is this close to the line
const DANGER_DISTANCE: f32 = 150.0;

#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Seconds spent "thinking" before each answer
    pub think_time: f32,
    /// Chance each answer is right, 0..=1
    pub accuracy: f64,
    rng: Pcg32,
    answering: Option<EnemyId>,
    waited: f32,
}

impl Autopilot {
    pub fn new(seed: u64, think_time: f32, accuracy: f64) -> Self {
        let accuracy = if accuracy.is_finite() {
            accuracy.clamp(0.0, 1.0)
        } else {
            log::warn!("Ignoring accuracy {}, answering perfectly", accuracy);
            1.0
        };
        Self {
            think_time: if think_time.is_finite() { think_time.max(0.0) } else { 0.0 },
            accuracy,
            rng: Pcg32::seed_from_u64(seed),
            answering: None,
            waited: 0.0,
        }
    }

    /// Decide this frame's input
    pub fn next_input(&mut self, state: &GameState, dt: f32) -> TickInput {
        let mut events = Vec::new();

        if state.is_over() {
            return TickInput::default();
        }
        if state.pause.level_up {
            events.push(InputEvent::SelectUpgrade);
            return TickInput::new(events);
        }
        if state.pause.chapter_transition {
            events.push(InputEvent::Continue);
            return TickInput::new(events);
        }
        if state.pause.manual {
            events.push(InputEvent::Pause);
        }

        match (state.target, state.question) {
            (Some(target), Some(question)) => {
                if self.answering != Some(target) {
                    self.answering = Some(target);
                    self.waited = 0.0;
                }
                self.waited += dt;
                if self.waited >= self.think_time {
                    self.waited = 0.0;
                    let answer = if self.rng.random_bool(self.accuracy) {
                        question.answer
                    } else {
                        question.answer + 1
                    };
                    events.extend(TickInput::answer(answer).events);
                }
            }
            _ => self.answering = None,
        }

        let danger = state
            .enemies
            .iter()
            .any(|e| e.active && !e.is_frozen() && e.pos.x < GAME_OVER_LINE_X + DANGER_DISTANCE);
        if danger && state.player.ice.is_ready() {
            events.push(InputEvent::CastSpell);
        }

        TickInput::new(events)
    }
}
