//! Wizard Math - an arithmetic arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (questions, spawning, chapters, combat)
//! - `ui`: Read-only HUD projection of the simulation
//! - `platform`: Browser/native logging setup
//! - `persistence`: Key/value storage backends
//! - `settings`: Session configuration and player preferences

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod ui;

pub use highscores::HighScore;
pub use settings::{SessionConfig, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield dimensions
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Player sits on the left, feet 80px above the bottom edge
    pub const PLAYER_X: f32 = 100.0;
    pub const PLAYER_Y: f32 = SCREEN_HEIGHT - 80.0;
    /// Wand tip relative to the player origin
    pub const WAND_OFFSET_X: f32 = 20.0;
    pub const WAND_OFFSET_Y: f32 = -60.0;

    /// Enemies crossing this x damage the player
    pub const GAME_OVER_LINE_X: f32 = 150.0;
    /// Enemies closer than this past the game-over line are never targeted
    pub const TARGET_SAFETY_MARGIN: f32 = 100.0;
    /// Spawn x jitter beyond the right edge
    pub const SPAWN_OFFSET_MIN: i32 = 50;
    pub const SPAWN_OFFSET_MAX: i32 = 100;

    /// Player health
    pub const MAX_HEARTS: u8 = 3;
    pub const INVULNERABILITY_SECS: f32 = 1.5;

    /// Combat
    pub const ANSWER_DAMAGE: u32 = 1;
    pub const SCORE_CORRECT: u64 = 10;
    pub const SCORE_DEFEAT: u64 = 10;
    pub const EXP_PER_KILL: u32 = 1;
    /// Delay before the next question after a kill (death animation)
    pub const NEXT_QUESTION_DELAY: f32 = 0.75;
    /// Delay before retrying target selection when none qualified
    pub const TARGET_RETRY_DELAY: f32 = 0.5;
    /// Longest answer the input buffer accepts
    pub const MAX_INPUT_DIGITS: usize = 3;

    /// Leveling
    pub const START_EXP_TO_NEXT_LEVEL: u32 = 3;

    /// Chapters
    pub const CHAPTER_DEFEAT_QUOTA: u32 = 5;

    /// Storage keys
    pub const HIGH_SCORE_KEY: &str = "mathGameHighScore";
    pub const SETTINGS_KEY: &str = "mathGameSettings";
}

/// Linear interpolation between two points
#[inline]
pub fn lerp_point(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    from + (to - from) * t
}

/// Wand tip position used as the origin of projectile effects
#[inline]
pub fn wand_position() -> Vec2 {
    Vec2::new(
        consts::PLAYER_X + consts::WAND_OFFSET_X,
        consts::PLAYER_Y + consts::WAND_OFFSET_Y,
    )
}
