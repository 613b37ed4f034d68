//! Enemy variants and their shared behaviour

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Half the rendered enemy height; the visual centre sits this far above the feet
pub const ENEMY_HALF_HEIGHT: f32 = 32.0;

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Ghost,
    /// Fast loner
    Shadow,
    /// Slow, takes two hits
    Plant,
}

impl EnemyKind {
    pub fn name(&self) -> &'static str {
        match self {
            EnemyKind::Ghost => "Ghost",
            EnemyKind::Shadow => "Shadow",
            EnemyKind::Plant => "Plant",
        }
    }

    pub fn base_hit_points(&self) -> u32 {
        match self {
            EnemyKind::Ghost => 1,
            EnemyKind::Shadow => 1,
            EnemyKind::Plant => 2,
        }
    }

    /// Innate speed in px/s (the difficulty table normally overrides it)
    pub fn base_move_speed(&self) -> f32 {
        match self {
            EnemyKind::Ghost => 35.0,
            EnemyKind::Shadow => 40.0,
            EnemyKind::Plant => 25.0,
        }
    }

    pub fn animation_key(&self) -> &'static str {
        match self {
            EnemyKind::Ghost => "ghost_idle",
            EnemyKind::Shadow => "shadow_idle",
            EnemyKind::Plant => "plant_idle",
        }
    }
}

/// Stable handle into the enemy collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// An enemy walking toward the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    /// Feet position (x grows to the right)
    pub pos: Vec2,
    pub hp: u32,
    pub move_speed: f32,
    /// False once defeated or destroyed; inactive enemies are swept at frame end
    pub active: bool,
    /// Seconds of freeze remaining
    pub frozen_for: f32,
}

impl Enemy {
    pub fn new(id: EnemyId, kind: EnemyKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            hp: kind.base_hit_points(),
            move_speed: kind.base_move_speed(),
            active: true,
            frozen_for: 0.0,
        }
    }

    /// Apply damage; returns true if this hit defeated the enemy
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.active {
            return false;
        }
        self.hp = self.hp.saturating_sub(amount);
        if self.hp == 0 {
            self.active = false;
            return true;
        }
        false
    }

    /// Stop moving for `duration` seconds (longest freeze wins)
    pub fn freeze(&mut self, duration: f32) {
        self.frozen_for = self.frozen_for.max(duration);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen_for > 0.0
    }

    /// Walk left unless frozen
    pub fn advance(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        if self.frozen_for > 0.0 {
            self.frozen_for = (self.frozen_for - dt).max(0.0);
            return;
        }
        self.pos.x -= self.move_speed * dt;
    }

    /// Visual centre, used to aim projectiles
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y - ENEMY_HALF_HEIGHT)
    }

    /// Remove from play without a defeat (e.g. collided with the player)
    pub fn destroy(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plant_survives_first_hit() {
        let mut plant = Enemy::new(EnemyId(1), EnemyKind::Plant, Vec2::new(500.0, 520.0));
        assert!(!plant.take_damage(1));
        assert!(plant.active);
        assert!(plant.take_damage(1));
        assert!(!plant.active);
        // Already defeated
        assert!(!plant.take_damage(1));
    }

    #[test]
    fn test_frozen_enemy_does_not_move() {
        let mut ghost = Enemy::new(EnemyId(1), EnemyKind::Ghost, Vec2::new(500.0, 520.0));
        ghost.move_speed = 60.0;
        ghost.freeze(1.0);
        ghost.advance(0.5);
        assert_eq!(ghost.pos.x, 500.0);
        ghost.advance(0.5);
        assert!(!ghost.is_frozen());
        ghost.advance(0.5);
        assert!((ghost.pos.x - 470.0).abs() < 0.001);
    }
}
