//! Target selection and answer resolution
//!
//! A question is always attached to one live enemy. Answering it correctly
//! fires a bolt at that enemy; wrong answers only produce feedback.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::effects::{Effect, LightningBolt, SoundCue};
use super::enemy::EnemyId;
use super::question::{Question, QuestionConfig, generate};
use super::state::{AnswerRecord, GameEvent, GameState};
use super::timer::Timer;
use crate::consts::*;
use crate::wand_position;

/// Max vertical offset of the bolt's impact point
const BOLT_TARGET_JITTER: i32 = 10;

impl GameState {
    /// Whether an enemy is far enough from the player to be asked about
    fn is_candidate(x: f32) -> bool {
        x > GAME_OVER_LINE_X + TARGET_SAFETY_MARGIN
    }

    /// Make sure a question is attached to a live enemy.
    ///
    /// Keeps the current target while it's alive. Otherwise picks a random
    /// qualifying enemy and generates a fresh question for it; with nothing
    /// qualifying the question is hidden and `None` returned.
    pub fn select_target(&mut self) -> Option<EnemyId> {
        if let Some(id) = self.target {
            if self.live_enemy(id).is_some() {
                return Some(id);
            }
        }
        self.target = None;

        let candidates: Vec<EnemyId> = self
            .enemies
            .iter()
            .filter(|e| e.active && Self::is_candidate(e.pos.x))
            .map(|e| e.id)
            .collect();

        let Some(&id) = candidates.choose(&mut self.rng) else {
            if self.question.take().is_some() {
                self.emit(GameEvent::QuestionHidden);
            }
            return None;
        };

        let allow_one = self.allow_easy_multiplication();
        let config = QuestionConfig {
            difficulty: self.config.difficulty,
            operators: &self.config.selected_operators,
            tables: &self.config.selected_tables,
            allow_easy_multiplication: allow_one,
        };
        let question = generate(&mut self.rng, &config).unwrap_or_else(|| {
            log::warn!("Question generation failed, using fallback");
            Question::fallback()
        });

        log::debug!("Targeting enemy #{} with {}", id.0, question);
        self.target = Some(id);
        self.question = Some(question);
        self.question_shown_at = self.time;
        self.input.clear();
        self.emit(GameEvent::QuestionShown {
            target: id,
            question,
        });
        Some(id)
    }

    /// Append a digit to the answer box (capped at three digits)
    pub fn type_digit(&mut self, digit: u8) {
        if digit > 9 || self.input.len() >= MAX_INPUT_DIGITS {
            return;
        }
        self.input.push(char::from(b'0' + digit));
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Check the typed answer against the current question.
    ///
    /// Empty input is ignored. Input is cleared after every real submission.
    pub fn submit_answer(&mut self) {
        if self.input.is_empty() {
            return;
        }
        let typed = std::mem::take(&mut self.input);
        let Some(question) = self.question else {
            log::debug!("Answer {} submitted with no question showing", typed);
            return;
        };

        let value = typed.parse::<u32>().ok();
        let correct = value.is_some_and(|v| question.is_answered_by(v));
        let elapsed = (self.time - self.question_shown_at).max(0.0);
        self.stats.push(AnswerRecord {
            num1: question.num1,
            num2: question.num2,
            operator: question.operator,
            answer_given: typed,
            correct_answer: question.answer,
            time_taken_ms: (elapsed * 1000.0).round() as u64,
            correct,
        });
        self.emit(GameEvent::AnswerChecked { correct });

        if correct {
            self.resolve_correct();
        } else {
            self.resolve_wrong();
        }
    }

    fn resolve_correct(&mut self) {
        self.score += SCORE_CORRECT;
        self.effect(Effect::sound(SoundCue::Correct));

        let target = self.target.filter(|&id| self.live_enemy(id).is_some());
        let Some(id) = target else {
            // Target died or left before the answer landed
            log::debug!("Correct answer for a lost target, choosing another");
            self.target = None;
            self.question = None;
            self.select_target();
            return;
        };

        self.effect(Effect::sound(SoundCue::Cast));
        self.fire_bolt(id);

        let Some(enemy) = self.live_enemy_mut(id) else {
            return;
        };
        let kind = enemy.kind;
        let defeated = enemy.take_damage(ANSWER_DAMAGE);
        let hp_left = enemy.hp;

        if !defeated {
            // Same question stays up for the surviving enemy
            self.emit(GameEvent::EnemyDamaged { id, hp_left });
            return;
        }

        log::debug!("{} #{} defeated", kind.name(), id.0);
        self.score += SCORE_DEFEAT;
        self.effect(Effect::Sound {
            cue: SoundCue::EnemyHit,
            delay: 0.15,
            volume: 1.0,
        });
        self.emit(GameEvent::EnemyDefeated { id, kind });

        self.target = None;
        self.question = None;
        self.emit(GameEvent::QuestionHidden);

        self.grant_exp(EXP_PER_KILL);

        if self.chapters.record_defeat() {
            self.complete_chapter();
        } else {
            self.target_retry = None;
            self.next_question = Some(Timer::new(NEXT_QUESTION_DELAY));
        }
    }

    fn resolve_wrong(&mut self) {
        self.effect(Effect::shake(0.15, 0.008));
        self.effect(Effect::InputError { duration: 0.3 });
        self.effect(Effect::sound(SoundCue::Wrong));
    }

    fn fire_bolt(&mut self, id: EnemyId) {
        let Some(center) = self.live_enemy(id).map(|e| e.center()) else {
            return;
        };
        let jitter = self.rng.random_range(-BOLT_TARGET_JITTER..=BOLT_TARGET_JITTER) as f32;
        let to = center + Vec2::new(0.0, jitter);
        let bolt_id = self.next_entity_id();
        let bolt = LightningBolt::new(bolt_id, &mut self.rng, wand_position(), to);
        self.bolts.push(bolt);
    }

    /// Cast the ice spell if it's ready, freezing every enemy in play
    pub fn cast_spell(&mut self) -> bool {
        let Some(duration) = self.player.ice.cast() else {
            return false;
        };
        log::info!("Ice spell cast, freezing for {:.2}s", duration);
        for enemy in self.enemies.iter_mut().filter(|e| e.active) {
            enemy.freeze(duration);
        }
        self.effect(Effect::Flash {
            duration: 0.15,
            rgb: [100, 150, 255],
        });
        self.effect(Effect::FrostOverlay { duration: 0.3 });
        self.effect(Effect::sound(SoundCue::Cast));
        self.emit(GameEvent::SpellCast {
            freeze_secs: duration,
        });
        true
    }

    /// Per-frame check that the question still has a live target.
    ///
    /// A lost target is replaced right away. With no target and enemies in
    /// play, selection is retried after a short delay unless the post-kill
    /// delay is already pending.
    pub(crate) fn refresh_target(&mut self) {
        match self.target {
            Some(id) if self.live_enemy(id).is_some() => {}
            Some(_) => {
                self.target = None;
                self.question = None;
                self.emit(GameEvent::QuestionHidden);
                self.select_target();
            }
            None => {
                if self.active_enemy_count() > 0
                    && self.next_question.is_none()
                    && self.target_retry.is_none()
                {
                    self.target_retry = Some(Timer::new(TARGET_RETRY_DELAY));
                }
            }
        }
    }
}
