//! Read-only HUD projection of the game state
//!
//! The presentation layer draws from a `HudView` built once per frame; it
//! never reaches into the simulation directly.

use glam::Vec2;

use crate::consts::MAX_HEARTS;
use crate::sim::chapter::ChapterPhase;
use crate::sim::enemy::{ENEMY_HALF_HEIGHT, EnemyId};
use crate::sim::state::{GamePhase, GameState};

/// Gap between the question box and the top of its target
const QUESTION_GAP: f32 = 30.0;

/// Full-screen panel on top of the playfield, if any
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    None,
    Paused,
    LevelUp { level: u32, choice: String },
    ChapterComplete { number: u32 },
    Lore { text: &'static str },
    GameOver { score: u64 },
    Victory { score: u64, level: u32 },
}

/// One enemy as the presentation draws it
#[derive(Debug, Clone, PartialEq)]
pub struct EnemySprite {
    pub id: EnemyId,
    pub pos: Vec2,
    pub animation: &'static str,
    /// Tinted blue while the ice spell holds it
    pub frozen: bool,
    pub targeted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudView {
    /// "a op b = ?" while a question is attached to a target
    pub question_text: Option<String>,
    /// Where the question box floats, above its target
    pub question_anchor: Option<Vec2>,
    /// Typed digits, or "_" when empty
    pub input_text: String,
    pub score: u64,
    pub hearts: u8,
    pub max_hearts: u8,
    pub level: u32,
    /// EXP bar fill, 0..=1
    pub exp_fraction: f32,
    /// None until the spell is learned
    pub spell_ready: Option<f32>,
    pub chapter: Option<u32>,
    /// Defeats so far and the quota
    pub chapter_progress: (u32, u32),
    pub enemies: Vec<EnemySprite>,
    pub overlay: Overlay,
}

impl HudView {
    pub fn from_state(state: &GameState) -> Self {
        let anchored = state
            .target
            .and_then(|id| state.live_enemy(id))
            .zip(state.question);

        let chapter = state.chapters.current();

        Self {
            question_text: anchored.map(|(_, q)| q.to_string()),
            question_anchor: anchored.map(|(enemy, _)| {
                Vec2::new(enemy.pos.x, enemy.pos.y - ENEMY_HALF_HEIGHT * 2.0 - QUESTION_GAP)
            }),
            input_text: if state.input.is_empty() {
                "_".to_string()
            } else {
                state.input.clone()
            },
            score: state.score,
            hearts: state.player.hearts,
            max_hearts: MAX_HEARTS,
            level: state.player.level,
            exp_fraction: state.player.exp_fraction(),
            spell_ready: state
                .player
                .ice
                .is_learned()
                .then(|| state.player.ice.cooldown_progress()),
            chapter: chapter.map(|c| c.number),
            chapter_progress: (
                state.chapters.defeated(),
                chapter.map(|c| c.enemies_to_defeat).unwrap_or_default(),
            ),
            enemies: state
                .enemies
                .iter()
                .filter(|e| e.active)
                .map(|e| EnemySprite {
                    id: e.id,
                    pos: e.pos,
                    animation: e.kind.animation_key(),
                    frozen: e.is_frozen(),
                    targeted: state.target == Some(e.id),
                })
                .collect(),
            overlay: overlay(state),
        }
    }
}

fn overlay(state: &GameState) -> Overlay {
    match state.phase {
        GamePhase::GameOver => return Overlay::GameOver { score: state.score },
        GamePhase::Victory => {
            return Overlay::Victory {
                score: state.score,
                level: state.player.level,
            };
        }
        GamePhase::Playing => {}
    }

    if state.pause.level_up {
        return Overlay::LevelUp {
            level: state.player.level,
            choice: state.player.ice.upgrade_label(),
        };
    }

    match state.chapters.phase() {
        ChapterPhase::CompleteScreen => Overlay::ChapterComplete {
            number: state.chapters.current().map(|c| c.number).unwrap_or_default(),
        },
        ChapterPhase::Lore => Overlay::Lore {
            text: state.chapters.current().map(|c| c.lore_text).unwrap_or_default(),
        },
        _ if state.pause.manual => Overlay::Paused,
        _ => Overlay::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SessionConfig;

    #[test]
    fn test_fresh_session_view() {
        let state = GameState::new(1, SessionConfig::default());
        let hud = HudView::from_state(&state);
        assert_eq!(hud.question_text, None);
        assert_eq!(hud.input_text, "_");
        assert_eq!(hud.hearts, 3);
        assert_eq!(hud.spell_ready, None);
        assert_eq!(hud.chapter, Some(1));
        assert_eq!(hud.chapter_progress, (0, 5));
        assert_eq!(hud.overlay, Overlay::None);
    }

    #[test]
    fn test_question_floats_above_target() {
        let mut state = GameState::new(1, SessionConfig::default());
        let id = state.spawn_enemy();
        state.select_target();
        let hud = HudView::from_state(&state);
        let enemy = state.live_enemy(id).unwrap();
        assert!(hud.question_text.unwrap().ends_with("= ?"));
        assert_eq!(hud.enemies.len(), 1);
        assert!(hud.enemies[0].targeted);
        assert_eq!(hud.enemies[0].animation, "ghost_idle");
        assert_eq!(hud.question_anchor.unwrap().x, enemy.pos.x);
    }

    #[test]
    fn test_pause_overlay() {
        let mut state = GameState::new(1, SessionConfig::default());
        state.toggle_pause();
        assert_eq!(HudView::from_state(&state).overlay, Overlay::Paused);
    }
}
