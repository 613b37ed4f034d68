//! Game state and session transitions
//!
//! Everything a running session owns lives in [`GameState`]; the layered pause
//! flags replace scattered booleans and every transition goes through a method
//! here so the flags can't drift apart.

use rand::{Rng, SeedableRng};
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::chapter::{ChapterAdvance, ChapterPhase, ChapterProgress};
use super::effects::{Effect, LightningBolt, SoundCue};
use super::enemy::{Enemy, EnemyId, EnemyKind};
use super::player::{DamageOutcome, PlayerState};
use super::question::{Operator, Question};
use super::spawner::WaveSpawner;
use super::timer::Timer;
use crate::consts::*;
use crate::settings::SessionConfig;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Hearts ran out
    GameOver,
    /// Every chapter cleared
    Victory,
}

/// Independent reasons the simulation is frozen; any one stops the update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseFlags {
    pub manual: bool,
    pub level_up: bool,
    pub chapter_transition: bool,
}

impl PauseFlags {
    pub fn any(&self) -> bool {
        self.manual || self.level_up || self.chapter_transition
    }
}

/// Things that happened this frame, for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Effect(Effect),
    EnemySpawned { id: EnemyId, kind: EnemyKind },
    QuestionShown { target: EnemyId, question: Question },
    QuestionHidden,
    AnswerChecked { correct: bool },
    EnemyDamaged { id: EnemyId, hp_left: u32 },
    EnemyDefeated { id: EnemyId, kind: EnemyKind },
    PlayerHit { hearts_left: u8 },
    SpellCast { freeze_secs: f32 },
    LevelUp { level: u32, choice: String },
    SpellUpgraded { level: u32 },
    Paused,
    Resumed,
    ChapterStarted { number: u32, background_key: &'static str },
    ChapterComplete { number: u32 },
    ShowLore { text: &'static str },
    GameOver { score: u64 },
    Victory { score: u64, level: u32 },
}

/// One submitted answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub num1: u32,
    pub num2: u32,
    pub operator: Operator,
    /// Raw input as typed
    pub answer_given: String,
    pub correct_answer: u32,
    pub time_taken_ms: u64,
    pub correct: bool,
}

/// Aggregate view over a session's answers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub attempts: usize,
    pub correct: usize,
    /// 0..=1, 0 when nothing was answered
    pub accuracy: f32,
    pub mean_time_ms: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    records: Vec<AnswerRecord>,
}

impl SessionStats {
    pub fn push(&mut self, record: AnswerRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    pub fn summary(&self) -> StatsSummary {
        let attempts = self.records.len();
        let correct = self.records.iter().filter(|r| r.correct).count();
        let (accuracy, mean_time_ms) = if attempts == 0 {
            (0.0, 0.0)
        } else {
            let total: u64 = self.records.iter().map(|r| r.time_taken_ms).sum();
            (
                correct as f32 / attempts as f32,
                total as f64 / attempts as f64,
            )
        };
        StatsSummary {
            attempts,
            correct,
            accuracy,
            mean_time_ms,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Complete session state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub config: SessionConfig,
    pub phase: GamePhase,
    pub pause: PauseFlags,
    pub score: u64,
    pub player: PlayerState,
    /// Live enemies, in spawn (id) order
    pub enemies: Vec<Enemy>,
    /// Enemy the current question is attached to
    pub target: Option<EnemyId>,
    pub question: Option<Question>,
    /// Digits typed so far
    pub input: String,
    pub chapters: ChapterProgress,
    pub spawner: WaveSpawner,
    pub bolts: Vec<LightningBolt>,
    pub stats: SessionStats,
    /// Unpaused simulation time in seconds
    pub time: f32,
    pub time_ticks: u64,
    /// Post-kill delay before the next question
    pub(crate) next_question: Option<Timer>,
    /// Retry for target selection when nothing qualified
    pub(crate) target_retry: Option<Timer>,
    pub(crate) question_shown_at: f32,
    pub(crate) events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a session and start the first chapter
    pub fn new(seed: u64, config: SessionConfig) -> Self {
        let config = config.sanitized();
        log::info!(
            "New session: difficulty={} operators={:?} tables={:?} seed={}",
            config.difficulty.as_str(),
            config.selected_operators,
            config.selected_tables,
            seed
        );

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            spawner: WaveSpawner::new(config.difficulty),
            config,
            phase: GamePhase::Playing,
            pause: PauseFlags::default(),
            score: 0,
            player: PlayerState::new(),
            enemies: Vec::new(),
            target: None,
            question: None,
            input: String::new(),
            chapters: ChapterProgress::default(),
            bolts: Vec::new(),
            stats: SessionStats::default(),
            time: 0.0,
            time_ticks: 0,
            next_question: None,
            target_retry: None,
            question_shown_at: 0.0,
            events: Vec::new(),
            next_id: 1,
        };

        state.start_chapter(true);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_paused(&self) -> bool {
        self.pause.any()
    }

    pub fn is_over(&self) -> bool {
        self.phase != GamePhase::Playing
    }

    /// Take this frame's events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn effect(&mut self, effect: Effect) {
        self.events.push(GameEvent::Effect(effect));
    }

    pub fn active_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }

    /// Look up an enemy that is still in play
    pub fn live_enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id && e.active)
    }

    pub(crate) fn live_enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id && e.active)
    }

    /// Whether the current chapter lets 1 appear as a factor
    pub fn allow_easy_multiplication(&self) -> bool {
        self.chapters
            .current()
            .is_some_and(|c| c.allow_easy_multiplication)
    }

    /// Spawn one enemy of a type the current chapter allows
    pub fn spawn_enemy(&mut self) -> EnemyId {
        let allowed = self.chapters.current().map(|c| c.allowed_enemies).unwrap_or(&[]);
        let kind = match allowed.choose(&mut self.rng) {
            Some(&kind) => kind,
            None => {
                log::warn!("No allowed enemy types for this chapter, defaulting to Ghost");
                EnemyKind::Ghost
            }
        };

        let offset = self.rng.random_range(SPAWN_OFFSET_MIN..=SPAWN_OFFSET_MAX) as f32;
        let pos = glam::Vec2::new(SCREEN_WIDTH + offset, PLAYER_Y);
        let id = EnemyId(self.next_entity_id());

        let mut enemy = Enemy::new(id, kind, pos);
        enemy.move_speed = self.config.difficulty.enemy_speed();
        self.enemies.push(enemy);

        log::debug!(
            "Spawned {} #{} at x={:.0} speed={}",
            kind.name(),
            id.0,
            pos.x,
            self.config.difficulty.enemy_speed()
        );
        self.emit(GameEvent::EnemySpawned { id, kind });
        id
    }

    /// Set up the chapter the progression is pointing at
    pub(crate) fn start_chapter(&mut self, first: bool) {
        let Some(chapter) = self.chapters.begin() else {
            if self.chapters.phase() == ChapterPhase::Victory {
                self.trigger_victory();
            }
            return;
        };
        log::info!("Starting chapter {}", chapter.number);

        self.pause.chapter_transition = false;
        self.enemies.clear();
        self.target = None;
        self.question = None;
        self.input.clear();
        self.next_question = None;
        self.target_retry = None;
        self.fade_bolts();

        self.emit(GameEvent::ChapterStarted {
            number: chapter.number,
            background_key: chapter.background_key,
        });
        self.effect(Effect::PlayMusic {
            key: chapter.music_key,
        });

        self.spawner.start(first);
        self.select_target();
    }

    /// Quota met: freeze and show the "Chapter Complete" screen
    pub(crate) fn complete_chapter(&mut self) {
        let number = self.chapters.current().map(|c| c.number).unwrap_or_default();
        log::info!("Chapter {} complete", number);

        self.pause.chapter_transition = true;
        self.target = None;
        if self.question.take().is_some() {
            self.emit(GameEvent::QuestionHidden);
        }
        self.input.clear();
        self.effect(Effect::StopMusic);
        self.effect(Effect::sound(SoundCue::ChapterComplete));
        self.emit(GameEvent::ChapterComplete { number });
    }

    /// Player pressed continue on a chapter screen
    pub fn continue_chapter(&mut self) {
        if self.is_over() {
            return;
        }
        match self.chapters.phase() {
            ChapterPhase::CompleteScreen => match self.chapters.continue_from_complete() {
                None => {
                    if let Some(chapter) = self.chapters.current() {
                        self.emit(GameEvent::ShowLore {
                            text: chapter.lore_text,
                        });
                    }
                }
                Some(advance) => self.apply_advance(advance),
            },
            ChapterPhase::Lore => {
                if let Some(advance) = self.chapters.continue_from_lore() {
                    self.apply_advance(advance);
                }
            }
            _ => {}
        }
    }

    fn apply_advance(&mut self, advance: ChapterAdvance) {
        match advance {
            ChapterAdvance::NextChapter(_) => self.start_chapter(false),
            ChapterAdvance::Victory => self.trigger_victory(),
        }
    }

    /// All chapters cleared: freeze for good
    fn trigger_victory(&mut self) {
        if self.is_over() {
            return;
        }
        log::info!(
            "All chapters cleared! score={} level={}",
            self.score,
            self.player.level
        );
        self.phase = GamePhase::Victory;
        self.pause.chapter_transition = true;
        self.spawner.stop();
        self.enemies.clear();
        self.target = None;
        self.question = None;
        self.next_question = None;
        self.target_retry = None;
        self.fade_bolts();
        self.effect(Effect::StopMusic);
        self.effect(Effect::sound(SoundCue::Victory));
        self.emit(GameEvent::Victory {
            score: self.score,
            level: self.player.level,
        });
    }

    /// Drop bolts still in flight; their targets are gone
    fn fade_bolts(&mut self) {
        for bolt in std::mem::take(&mut self.bolts) {
            self.effect(Effect::BoltFade { bolt: bolt.id() });
        }
    }

    /// An enemy reached the player
    pub(crate) fn damage_player(&mut self, id: EnemyId) {
        match self.player.take_damage() {
            DamageOutcome::Ignored => {}
            DamageOutcome::Hurt { hearts_left } => {
                log::info!("Player hit, {} hearts left", hearts_left);
                self.player_hit_feedback(id, hearts_left);
            }
            DamageOutcome::Defeated => {
                self.player_hit_feedback(id, 0);
                self.trigger_game_over();
            }
        }
    }

    fn player_hit_feedback(&mut self, id: EnemyId, hearts_left: u8) {
        if let Some(enemy) = self.live_enemy_mut(id) {
            enemy.destroy();
        }
        self.effect(Effect::sound(SoundCue::Wrong));
        self.effect(Effect::shake(0.15, 0.008));
        self.emit(GameEvent::PlayerHit { hearts_left });
    }

    /// Hearts ran out; runs at most once per session
    pub(crate) fn trigger_game_over(&mut self) {
        if self.is_over() {
            return;
        }
        log::info!("Game over! score={}", self.score);
        self.phase = GamePhase::GameOver;
        self.spawner.stop();
        self.next_question = None;
        self.target_retry = None;
        self.fade_bolts();
        if self.question.take().is_some() {
            self.emit(GameEvent::QuestionHidden);
        }
        self.effect(Effect::shake(0.3, 0.015));
        self.effect(Effect::StopMusic);
        self.effect(Effect::sound(SoundCue::GameOver));
        self.emit(GameEvent::GameOver { score: self.score });
    }

    /// Manual pause toggle; refused during level-up, chapter screens and after the run
    pub fn toggle_pause(&mut self) {
        if self.is_over() || self.pause.level_up || self.pause.chapter_transition {
            return;
        }
        self.pause.manual = !self.pause.manual;
        if self.pause.manual {
            log::info!("Game paused");
            self.emit(GameEvent::Paused);
        } else {
            log::info!("Game resumed");
            self.emit(GameEvent::Resumed);
        }
    }

    /// Add EXP; pauses for the spell choice when a level is gained
    pub(crate) fn grant_exp(&mut self, amount: u32) {
        if self.is_over() {
            return;
        }
        if self.player.gain_exp(amount) == 0 {
            return;
        }
        // The level-up screen takes over from a manual pause
        self.pause.manual = false;
        self.pause.level_up = true;
        self.effect(Effect::Flash {
            duration: 0.25,
            rgb: [255, 255, 0],
        });
        self.effect(Effect::sound(SoundCue::LevelUp));
        self.emit(GameEvent::LevelUp {
            level: self.player.level,
            choice: self.player.ice.upgrade_label(),
        });
    }

    /// Player picked the offered spell upgrade
    pub fn select_upgrade(&mut self) {
        if !self.pause.level_up || !self.player.select_upgrade() {
            return;
        }
        self.emit(GameEvent::SpellUpgraded {
            level: self.player.ice.level,
        });

        if self.player.pending_upgrades() > 0 {
            // Another threshold was crossed by the same grant
            self.emit(GameEvent::LevelUp {
                level: self.player.level,
                choice: self.player.ice.upgrade_label(),
            });
        } else {
            self.pause.level_up = false;
            // A chapter screen opened by the same kill keeps the game frozen
            if !self.is_paused() {
                log::info!("Resuming after level-up");
                self.emit(GameEvent::Resumed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::question::Difficulty;

    /// Put a one-hit enemy in range and answer its question
    fn defeat_one(state: &mut GameState) {
        let id = state.spawn_enemy();
        if let Some(e) = state.live_enemy_mut(id) {
            e.pos.x = 600.0;
            e.hp = 1;
        }
        state.next_question = None;
        state.select_target();
        let answer = state.question.map(|q| q.answer).unwrap();
        for c in answer.to_string().bytes() {
            state.type_digit(c - b'0');
        }
        state.submit_answer();
    }

    /// Click through the chapter complete and lore screens
    fn continue_through_screens(state: &mut GameState) {
        while state.pause.chapter_transition && !state.is_over() {
            state.continue_chapter();
        }
    }

    fn session(difficulty: Difficulty) -> GameState {
        GameState::new(
            42,
            SessionConfig::new(difficulty, vec![3], vec![Operator::Multiply]),
        )
    }

    #[test]
    fn test_new_session_starts_first_chapter() {
        let mut state = session(Difficulty::Normal);
        assert_eq!(state.chapters.phase(), ChapterPhase::Active);
        assert_eq!(state.chapters.index(), 0);
        assert!(!state.is_paused());
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::ChapterStarted {
            number: 1,
            background_key: "background_dim"
        }));
        assert!(state.question.is_none());
    }

    #[test]
    fn test_spawn_uses_chapter_allow_list_and_difficulty_speed() {
        let mut state = session(Difficulty::Hard);
        for _ in 0..10 {
            state.spawn_enemy();
        }
        assert!(state.enemies.iter().all(|e| e.kind == EnemyKind::Ghost));
        assert!(state.enemies.iter().all(|e| e.move_speed == 70.0));
        assert!(
            state
                .enemies
                .iter()
                .all(|e| e.pos.x >= SCREEN_WIDTH + 50.0 && e.pos.x <= SCREEN_WIDTH + 100.0)
        );
        assert!(state.enemies.iter().all(|e| e.pos.y == PLAYER_Y));
    }

    #[test]
    fn test_game_over_fires_once() {
        let mut state = session(Difficulty::Normal);
        for _ in 0..6 {
            let id = state.spawn_enemy();
            state.damage_player(id);
            state.player.tick(INVULNERABILITY_SECS + 0.01);
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.player.hearts, 0);
        let game_overs = state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_manual_pause_refused_during_level_up() {
        let mut state = session(Difficulty::Normal);
        state.grant_exp(3);
        assert!(state.pause.level_up);
        state.toggle_pause();
        assert!(!state.pause.manual);
        state.select_upgrade();
        assert!(!state.is_paused());
        assert_eq!(state.player.ice.level, 1);
    }

    #[test]
    fn test_level_up_cancels_manual_pause() {
        let mut state = session(Difficulty::Normal);
        state.toggle_pause();
        assert!(state.pause.manual);
        state.grant_exp(3);
        assert!(!state.pause.manual);
        assert!(state.pause.level_up);
    }

    #[test]
    fn test_multi_level_grant_offers_one_choice_per_level() {
        let mut state = session(Difficulty::Normal);
        state.grant_exp(10);
        assert_eq!(state.player.level, 3);
        state.select_upgrade();
        assert!(state.pause.level_up);
        state.select_upgrade();
        assert!(!state.pause.level_up);
        assert_eq!(state.player.ice.level, 2);
    }

    #[test]
    fn test_level_up_on_quota_kill_stays_frozen_for_chapter_screen() {
        let mut state = session(Difficulty::Practice);
        for _ in 0..9 {
            defeat_one(&mut state);
            while state.pause.level_up {
                state.select_upgrade();
            }
            continue_through_screens(&mut state);
        }
        assert_eq!(state.chapters.index(), 1);
        assert_eq!(state.chapters.defeated(), 4);
        state.drain_events();

        // 10th kill: chapter 2 quota and the second level-up together
        defeat_one(&mut state);
        assert!(state.pause.level_up);
        assert!(state.pause.chapter_transition);
        assert_eq!(state.player.level, 3);

        state.select_upgrade();
        assert!(!state.pause.level_up);
        assert!(state.is_paused());
        assert_eq!(state.chapters.phase(), ChapterPhase::CompleteScreen);
        assert!(!state.drain_events().contains(&GameEvent::Resumed));
    }

    #[test]
    fn test_pending_bolt_fades_when_next_chapter_starts() {
        let mut state = session(Difficulty::Practice);
        for _ in 0..5 {
            defeat_one(&mut state);
            while state.pause.level_up {
                state.select_upgrade();
            }
        }
        assert_eq!(state.chapters.phase(), ChapterPhase::CompleteScreen);
        let pending: Vec<u32> = state.bolts.iter().map(|b| b.id()).collect();
        assert!(!pending.is_empty());
        state.drain_events();

        continue_through_screens(&mut state);
        assert_eq!(state.chapters.index(), 1);
        assert!(state.bolts.is_empty());
        let events = state.drain_events();
        for bolt in pending {
            assert!(events.contains(&GameEvent::Effect(Effect::BoltFade { bolt })));
        }
    }

    #[test]
    fn test_victory_leaves_no_bolts() {
        let mut state = session(Difficulty::Practice);
        while !state.is_over() {
            defeat_one(&mut state);
            while state.pause.level_up {
                state.select_upgrade();
            }
            continue_through_screens(&mut state);
        }
        assert_eq!(state.phase, GamePhase::Victory);
        assert!(state.bolts.is_empty());
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::Effect(Effect::BoltFade { .. })))
        );
    }

    #[test]
    fn test_stats_summary() {
        let mut stats = SessionStats::default();
        assert_eq!(stats.summary().attempts, 0);
        for (correct, ms) in [(true, 1000), (false, 3000)] {
            stats.push(AnswerRecord {
                num1: 3,
                num2: 4,
                operator: Operator::Multiply,
                answer_given: "12".into(),
                correct_answer: 12,
                time_taken_ms: ms,
                correct,
            });
        }
        let summary = stats.summary();
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.accuracy, 0.5);
        assert_eq!(summary.mean_time_ms, 2000.0);
        assert!(stats.to_json().unwrap().contains("answer_given"));
    }
}
