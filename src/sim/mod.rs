//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod autoplay;
pub mod chapter;
pub mod combat;
pub mod effects;
pub mod enemy;
pub mod player;
pub mod question;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timer;

pub use autoplay::Autopilot;
pub use chapter::{CHAPTERS, Chapter, ChapterAdvance, ChapterPhase, ChapterProgress};
pub use effects::{Effect, LightningBolt, SoundCue};
pub use enemy::{Enemy, EnemyId, EnemyKind};
pub use player::{DamageOutcome, PlayerState, Spell};
pub use question::{Difficulty, Operator, Question, QuestionConfig, generate};
pub use spawner::{SpawnerState, WaveSpawner};
pub use state::{AnswerRecord, GameEvent, GamePhase, GameState, PauseFlags, SessionStats, StatsSummary};
pub use tick::{InputEvent, TickInput, tick};
pub use timer::Timer;
