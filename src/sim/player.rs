//! Player health, experience curve and spells

use serde::{Deserialize, Serialize};

use super::timer::{Timer, fire};
use crate::consts::{INVULNERABILITY_SECS, MAX_HEARTS, START_EXP_TO_NEXT_LEVEL};

/// Ice spell cooldown before the first upgrade (seconds)
const ICE_BASE_COOLDOWN: f32 = 8.0;
/// Ice spell freeze duration before the first upgrade (seconds)
const ICE_BASE_DURATION: f32 = 3.0;

/// The freeze spell unlocked through level-ups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spell {
    /// 0 = not learned yet
    pub level: u32,
    /// Seconds between casts
    pub cooldown: f32,
    /// Freeze duration in seconds
    pub duration: f32,
    cooldown_remaining: f32,
}

impl Default for Spell {
    fn default() -> Self {
        Self {
            level: 0,
            cooldown: ICE_BASE_COOLDOWN,
            duration: ICE_BASE_DURATION,
            cooldown_remaining: 0.0,
        }
    }
}

impl Spell {
    pub fn is_learned(&self) -> bool {
        self.level > 0
    }

    pub fn is_ready(&self) -> bool {
        self.is_learned() && self.cooldown_remaining <= 0.0
    }

    /// Raise the level and recompute cooldown and duration
    pub fn upgrade(&mut self) {
        self.level += 1;
        let level = self.level as f32;
        self.cooldown = (9.0 - level).max(2.0);
        self.duration = 3.0 + level * 0.75;
        log::info!(
            "Ice spell level {}: cooldown {:.1}s, duration {:.2}s",
            self.level,
            self.cooldown,
            self.duration
        );
    }

    /// Start the cooldown; returns the freeze duration if the cast happened
    pub fn cast(&mut self) -> Option<f32> {
        if !self.is_ready() {
            return None;
        }
        self.cooldown_remaining = self.cooldown;
        Some(self.duration)
    }

    pub fn tick(&mut self, dt: f32) {
        if self.cooldown_remaining > 0.0 {
            self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
        }
    }

    /// 0 right after a cast, 1 when ready
    pub fn cooldown_progress(&self) -> f32 {
        if self.cooldown <= 0.0 {
            return 1.0;
        }
        (1.0 - self.cooldown_remaining / self.cooldown).clamp(0.0, 1.0)
    }

    /// Text for the level-up choice
    pub fn upgrade_label(&self) -> String {
        if self.level == 0 {
            "Learn Ice Spell".to_string()
        } else {
            format!(
                "Upgrade Ice Spell (Lvl {}) (CD: {}s, Dur: {}s)",
                self.level + 1,
                self.cooldown,
                self.duration
            )
        }
    }
}

/// What a hit on the player did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable or already down
    Ignored,
    Hurt { hearts_left: u8 },
    /// Last heart lost
    Defeated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub hearts: u8,
    pub level: u32,
    pub exp: u32,
    pub exp_to_next_level: u32,
    pub ice: Spell,
    invulnerable: Option<Timer>,
    /// Level-ups whose spell choice hasn't been made yet
    pending_upgrades: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerState {
    pub fn new() -> Self {
        Self {
            hearts: MAX_HEARTS,
            level: 1,
            exp: 0,
            exp_to_next_level: START_EXP_TO_NEXT_LEVEL,
            ice: Spell::default(),
            invulnerable: None,
            pending_upgrades: 0,
        }
    }

    /// Add experience and resolve every threshold it crosses.
    ///
    /// Ignored while a level-up choice is pending. Returns the number of
    /// levels gained.
    pub fn gain_exp(&mut self, amount: u32) -> u32 {
        if self.pending_upgrades > 0 {
            log::debug!("Ignoring {} EXP while a level-up is pending", amount);
            return 0;
        }

        self.exp += amount;
        let mut gained = 0;
        while self.exp >= self.exp_to_next_level {
            self.exp -= self.exp_to_next_level;
            self.level += 1;
            // Thresholds run 3, 7, 12, 18, 25, ...
            self.exp_to_next_level += self.level + 2;
            gained += 1;
            log::info!(
                "Level up! Reached level {}, next at {} EXP (remainder {})",
                self.level,
                self.exp_to_next_level,
                self.exp
            );
        }
        self.pending_upgrades += gained;
        gained
    }

    pub fn pending_upgrades(&self) -> u32 {
        self.pending_upgrades
    }

    /// Apply one pending spell choice; returns false if none was pending
    pub fn select_upgrade(&mut self) -> bool {
        if self.pending_upgrades == 0 {
            return false;
        }
        self.ice.upgrade();
        self.pending_upgrades -= 1;
        true
    }

    /// EXP bar fill in 0..=1
    pub fn exp_fraction(&self) -> f32 {
        if self.exp_to_next_level == 0 {
            return 1.0;
        }
        (self.exp as f32 / self.exp_to_next_level as f32).clamp(0.0, 1.0)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable.is_some()
    }

    /// Lose a heart unless invulnerable; starts the invulnerability window
    pub fn take_damage(&mut self) -> DamageOutcome {
        if self.hearts == 0 || self.is_invulnerable() {
            return DamageOutcome::Ignored;
        }
        self.hearts -= 1;
        self.invulnerable = Some(Timer::new(INVULNERABILITY_SECS));
        if self.hearts == 0 {
            DamageOutcome::Defeated
        } else {
            DamageOutcome::Hurt {
                hearts_left: self.hearts,
            }
        }
    }

    /// Advance invulnerability and spell cooldown
    pub fn tick(&mut self, dt: f32) {
        if fire(&mut self.invulnerable, dt) {
            log::debug!("Player invulnerability ended");
        }
        self.ice.tick(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_sequence() {
        let mut player = PlayerState::new();
        let mut thresholds = vec![player.exp_to_next_level];
        for _ in 0..4 {
            let needed = player.exp_to_next_level - player.exp;
            assert_eq!(player.gain_exp(needed), 1);
            assert!(player.select_upgrade());
            thresholds.push(player.exp_to_next_level);
        }
        assert_eq!(thresholds, vec![3, 7, 12, 18, 25]);
        assert_eq!(player.level, 5);
    }

    #[test]
    fn test_large_grant_crosses_several_levels() {
        let mut player = PlayerState::new();
        // 3 + 7 = 10 reaches level 3 with 2 left over
        assert_eq!(player.gain_exp(12), 2);
        assert_eq!(player.level, 3);
        assert_eq!(player.exp, 2);
        assert!(player.exp < player.exp_to_next_level);
        assert_eq!(player.pending_upgrades(), 2);
    }

    #[test]
    fn test_exp_ignored_while_choice_pending() {
        let mut player = PlayerState::new();
        player.gain_exp(3);
        assert_eq!(player.gain_exp(100), 0);
        assert_eq!(player.exp, 0);
        player.select_upgrade();
        assert!(!player.select_upgrade());
    }

    #[test]
    fn test_ice_upgrade_formula() {
        let mut spell = Spell::default();
        assert!(!spell.is_ready());
        spell.upgrade();
        assert_eq!(spell.cooldown, 8.0);
        assert_eq!(spell.duration, 3.75);
        for _ in 0..10 {
            spell.upgrade();
        }
        assert_eq!(spell.cooldown, 2.0);
    }

    #[test]
    fn test_cast_cooldown() {
        let mut spell = Spell::default();
        spell.upgrade();
        assert_eq!(spell.cast(), Some(3.75));
        assert_eq!(spell.cast(), None);
        assert_eq!(spell.cooldown_progress(), 0.0);
        spell.tick(4.0);
        assert!((spell.cooldown_progress() - 0.5).abs() < 1e-6);
        spell.tick(4.0);
        assert!(spell.is_ready());
    }

    #[test]
    fn test_damage_and_invulnerability() {
        let mut player = PlayerState::new();
        assert_eq!(player.take_damage(), DamageOutcome::Hurt { hearts_left: 2 });
        assert_eq!(player.take_damage(), DamageOutcome::Ignored);
        player.tick(INVULNERABILITY_SECS + 0.01);
        assert_eq!(player.take_damage(), DamageOutcome::Hurt { hearts_left: 1 });
        player.tick(INVULNERABILITY_SECS + 0.01);
        assert_eq!(player.take_damage(), DamageOutcome::Defeated);
        player.tick(INVULNERABILITY_SECS + 0.01);
        assert_eq!(player.take_damage(), DamageOutcome::Ignored);
    }
}
