//! Landing noise
//!
//! A landing spawns two short-lived trigger volumes, one each side of the
//! player's feet. Archers that overlap one turn to investigate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::Countdown;
use crate::settings::NoiseTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseBurst {
    Narrow,
    Wide,
}

impl NoiseBurst {
    pub fn width(self, tuning: &NoiseTuning) -> f32 {
        match self {
            NoiseBurst::Narrow => tuning.narrow_width,
            NoiseBurst::Wide => tuning.wide_width,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseSignal {
    pub id: u32,
    /// Centre of the volume
    pub pos: Vec2,
    pub size: Vec2,
    pub lifetime: Countdown,
}

impl NoiseSignal {
    pub fn new(id: u32, pos: Vec2, size: Vec2, lifetime: f32) -> Self {
        Self {
            id,
            pos,
            size,
            lifetime: Countdown::start(lifetime),
        }
    }

    /// Returns true once the volume should be removed
    pub fn decide(&mut self, dt: f32) -> bool {
        self.lifetime.advance(dt);
        self.lifetime.is_expired()
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let half = self.size * 0.5;
        let d = (point - self.pos).abs();
        d.x <= half.x && d.y <= half.y
    }
}

/// Centres and size of the two volumes a landing at `feet` produces
pub fn burst_volumes(feet: Vec2, burst: NoiseBurst, tuning: &NoiseTuning) -> [(Vec2, Vec2); 2] {
    let width = burst.width(tuning);
    let y = feet.y + tuning.vertical_offset;
    let size = Vec2::new(width, tuning.height);
    [
        (Vec2::new(feet.x + width * 0.5, y), size),
        (Vec2::new(feet.x - width * 0.5, y), size),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_volumes() {
        let tuning = NoiseTuning::default();
        let [right, left] = burst_volumes(Vec2::new(1.0, 0.0), NoiseBurst::Wide, &tuning);
        assert_eq!(right.0, Vec2::new(4.5, 0.25));
        assert_eq!(left.0, Vec2::new(-2.5, 0.25));
        assert_eq!(right.1, Vec2::new(7.0, 0.5));
    }

    #[test]
    fn test_narrow_is_narrower() {
        let tuning = NoiseTuning::default();
        assert!(NoiseBurst::Narrow.width(&tuning) < NoiseBurst::Wide.width(&tuning));
    }

    #[test]
    fn test_contains() {
        let noise = NoiseSignal::new(1, Vec2::new(1.5, 0.25), Vec2::new(3.0, 0.5), 0.3);
        assert!(noise.contains(Vec2::new(2.9, 0.4)));
        assert!(!noise.contains(Vec2::new(3.1, 0.25)));
        assert!(!noise.contains(Vec2::new(1.5, 0.75)));
    }

    #[test]
    fn test_short_lifetime() {
        let mut noise = NoiseSignal::new(1, Vec2::ZERO, Vec2::ONE, 0.3);
        assert!(!noise.decide(0.2));
        assert!(noise.decide(0.2));
    }
}
