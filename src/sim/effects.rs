//! One-shot presentation requests and the lightning bolt draw sequence
//!
//! Nothing here feeds back into gameplay. The simulation pushes effects into
//! the frame's event list and the presentation layer plays them.

use glam::Vec2;
use rand::Rng;

use crate::lerp_point;

/// Sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Correct answer
    Correct,
    /// Wrong answer, or player hurt
    Wrong,
    /// Spell or bolt cast
    Cast,
    /// Bolt reached its target
    Zap,
    /// Target defeated
    EnemyHit,
    GameOver,
    LevelUp,
    ChapterComplete,
    Victory,
}

/// A visual or audio request for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CameraShake { duration: f32, intensity: f32 },
    Flash { duration: f32, rgb: [u8; 3] },
    /// Full-screen frost tint after the ice spell
    FrostOverlay { duration: f32 },
    /// Input box flashes red after a wrong answer
    InputError { duration: f32 },
    Sound { cue: SoundCue, delay: f32, volume: f32 },
    /// Draw one more segment of a bolt
    BoltSegment { bolt: u32, from: Vec2, to: Vec2 },
    /// Remove a finished bolt
    BoltFade { bolt: u32 },
    PlayMusic { key: &'static str },
    StopMusic,
}

impl Effect {
    pub fn sound(cue: SoundCue) -> Self {
        Effect::Sound {
            cue,
            delay: 0.0,
            volume: 1.0,
        }
    }

    pub fn shake(duration: f32, intensity: f32) -> Self {
        Effect::CameraShake {
            duration,
            intensity,
        }
    }
}

/// Segments per bolt
pub const BOLT_SEGMENTS: usize = 12;
/// Max pixel offset of interior bolt points
pub const BOLT_JITTER: i32 = 15;
/// Time to draw the whole bolt
pub const BOLT_DRAW_SECS: f32 = 0.075;
/// How long a drawn bolt stays visible
pub const BOLT_LINGER_SECS: f32 = 0.1;

/// A zig-zag bolt drawn one segment per scheduler step
#[derive(Debug, Clone)]
pub struct LightningBolt {
    id: u32,
    points: Vec<Vec2>,
    drawn: usize,
    elapsed: f32,
    linger: f32,
    finished: bool,
}

impl LightningBolt {
    pub fn new<R: Rng + ?Sized>(id: u32, rng: &mut R, from: Vec2, to: Vec2) -> Self {
        let mut points = Vec::with_capacity(BOLT_SEGMENTS + 1);
        points.push(from);
        for i in 1..=BOLT_SEGMENTS {
            let t = i as f32 / BOLT_SEGMENTS as f32;
            let mut p = lerp_point(from, to, t);
            // Endpoints stay exact
            if i < BOLT_SEGMENTS {
                p.x += rng.random_range(-BOLT_JITTER..=BOLT_JITTER) as f32;
                p.y += rng.random_range(-BOLT_JITTER..=BOLT_JITTER) as f32;
            }
            points.push(p);
        }
        Self {
            id,
            points,
            drawn: 0,
            elapsed: 0.0,
            linger: BOLT_LINGER_SECS,
            finished: false,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn segments_drawn(&self) -> usize {
        self.drawn
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance the draw sequence, pushing whatever steps came due
    pub fn advance(&mut self, dt: f32, out: &mut Vec<Effect>) {
        if self.finished {
            return;
        }

        let step = BOLT_DRAW_SECS / BOLT_SEGMENTS as f32;
        let segments = self.points.len() - 1;

        if self.drawn < segments {
            self.elapsed += dt;
            while self.elapsed >= step && self.drawn < segments {
                self.elapsed -= step;
                out.push(Effect::BoltSegment {
                    bolt: self.id,
                    from: self.points[self.drawn],
                    to: self.points[self.drawn + 1],
                });
                self.drawn += 1;
            }
            if self.drawn == segments {
                out.push(Effect::Sound {
                    cue: SoundCue::Zap,
                    delay: 0.0,
                    volume: 0.6,
                });
                out.push(Effect::shake(0.08, 0.005));
            }
            return;
        }

        self.linger -= dt;
        if self.linger <= 0.0 {
            out.push(Effect::BoltFade { bolt: self.id });
            self.finished = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_bolt_endpoints_exact() {
        let mut rng = Pcg32::seed_from_u64(1);
        let from = Vec2::new(120.0, 460.0);
        let to = Vec2::new(600.0, 480.0);
        let bolt = LightningBolt::new(1, &mut rng, from, to);
        assert_eq!(bolt.points().len(), BOLT_SEGMENTS + 1);
        assert_eq!(bolt.points()[0], from);
        assert_eq!(bolt.points()[BOLT_SEGMENTS], to);
    }

    #[test]
    fn test_bolt_draws_every_segment_then_fades() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut bolt = LightningBolt::new(7, &mut rng, Vec2::ZERO, Vec2::new(100.0, 0.0));
        let mut out = Vec::new();
        for _ in 0..30 {
            bolt.advance(1.0 / 60.0, &mut out);
        }
        assert!(bolt.is_finished());
        assert_eq!(bolt.segments_drawn(), BOLT_SEGMENTS);
        let segments = out
            .iter()
            .filter(|e| matches!(e, Effect::BoltSegment { bolt: 7, .. }))
            .count();
        assert_eq!(segments, BOLT_SEGMENTS);
        assert!(out.contains(&Effect::BoltFade { bolt: 7 }));
        let zaps = out
            .iter()
            .filter(|e| matches!(e, Effect::Sound { cue: SoundCue::Zap, .. }))
            .count();
        assert_eq!(zaps, 1);
    }
}
