//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::state::{GameEvent, GameState};
use super::timer::fire;
use crate::consts::*;

/// One player action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Number key 0-9
    Digit(u8),
    Backspace,
    /// Enter
    Submit,
    /// Ice spell key
    CastSpell,
    /// Pause toggle
    Pause,
    /// Take the offered level-up upgrade
    SelectUpgrade,
    /// Dismiss the chapter complete or lore screen
    Continue,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Actions in the order they happened
    pub events: Vec<InputEvent>,
}

impl TickInput {
    pub fn new(events: Vec<InputEvent>) -> Self {
        Self { events }
    }

    /// Type out `answer` and press enter
    pub fn answer(answer: u32) -> Self {
        let mut events: Vec<InputEvent> = answer
            .to_string()
            .bytes()
            .map(|b| InputEvent::Digit(b - b'0'))
            .collect();
        events.push(InputEvent::Submit);
        Self { events }
    }

    fn has(&self, event: InputEvent) -> bool {
        self.events.contains(&event)
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.is_over() {
        return;
    }

    // Screen controls work while paused; they're how a pause ends
    for event in &input.events {
        match event {
            InputEvent::Pause => state.toggle_pause(),
            InputEvent::SelectUpgrade => state.select_upgrade(),
            InputEvent::Continue => state.continue_chapter(),
            _ => {}
        }
    }

    // Don't tick if paused or finished
    if state.is_paused() || state.is_over() {
        return;
    }

    // Answer box
    for event in &input.events {
        match *event {
            InputEvent::Digit(d) => state.type_digit(d),
            InputEvent::Backspace => state.backspace(),
            InputEvent::Submit => {
                state.submit_answer();
                // A kill can open the level-up or chapter screen mid-frame
                if state.is_paused() {
                    return;
                }
            }
            _ => {}
        }
    }

    state.time += dt;
    state.time_ticks += 1;

    // Timers
    state.player.tick(dt);

    let active = state.active_enemy_count();
    if state.spawner.update(dt, active) {
        state.spawn_enemy();
    }

    if fire(&mut state.next_question, dt) {
        state.select_target();
    }
    if fire(&mut state.target_retry, dt) {
        state.select_target();
    }

    let mut effects = Vec::new();
    for bolt in &mut state.bolts {
        bolt.advance(dt, &mut effects);
    }
    state.bolts.retain(|b| !b.is_finished());
    state
        .events
        .extend(effects.into_iter().map(GameEvent::Effect));

    // Movement
    for enemy in state.enemies.iter_mut().filter(|e| e.active) {
        enemy.advance(dt);
    }

    // Enemies reaching the player
    let arrived: Vec<_> = state
        .enemies
        .iter()
        .filter(|e| e.active && e.pos.x < GAME_OVER_LINE_X)
        .map(|e| e.id)
        .collect();
    for id in arrived {
        state.damage_player(id);
        if state.is_over() {
            return;
        }
    }

    if input.has(InputEvent::CastSpell) {
        state.cast_spell();
    }

    state.refresh_target();

    // Sweep destroyed enemies
    state.enemies.retain(|e| e.active);
}
