//! Arrows
//!
//! Fly at constant velocity until they stick in a surface, then sit there
//! until their lifetime runs out.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::Countdown;
use crate::Facing;
use crate::settings::ArrowContactPolicy;

/// Scale the template's horizontal component by the archer's facing
#[inline]
pub fn launch_velocity(template: Vec2, facing: Facing) -> Vec2 {
    Vec2::new(template.x * facing.sign(), template.y)
}

/// Outcome of an arrow touching the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHit {
    pub lethal: bool,
    pub destroy_arrow: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arrow {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub lifetime: Countdown,
    /// Stuck in a surface; no longer moves or hurts
    pub landed: bool,
}

impl Arrow {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, lifetime: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            lifetime: Countdown::start(lifetime),
            landed: false,
        }
    }

    /// Physics tick: kinematic straight-line motion
    pub fn fixed_update(&mut self, dt: f32) {
        if !self.landed {
            self.pos += self.vel * dt;
        }
    }

    /// Decision tick. Returns true once the arrow should be removed.
    pub fn decide(&mut self, dt: f32) -> bool {
        self.lifetime.advance(dt);
        self.lifetime.is_expired()
    }

    /// Hit ground or ceiling
    pub fn land(&mut self) {
        if !self.landed {
            self.landed = true;
            self.vel = Vec2::ZERO;
        }
    }

    pub fn touch_player(&self, policy: ArrowContactPolicy) -> PlayerHit {
        let destroy_arrow = match policy {
            ArrowContactPolicy::Always => true,
            ArrowContactPolicy::LandedOnly => self.landed,
        };
        PlayerHit {
            lethal: !self.landed,
            destroy_arrow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_velocity_mirrors_x() {
        let v = launch_velocity(Vec2::new(6.0, 2.0), Facing::Left);
        assert_eq!(v, Vec2::new(-6.0, 2.0));
        let v = launch_velocity(Vec2::new(6.0, 2.0), Facing::Right);
        assert_eq!(v, Vec2::new(6.0, 2.0));
    }

    #[test]
    fn test_flies_then_sticks() {
        let mut arrow = Arrow::new(1, Vec2::ZERO, Vec2::new(8.0, 0.0), 3.0);
        arrow.fixed_update(0.5);
        assert_eq!(arrow.pos, Vec2::new(4.0, 0.0));

        arrow.land();
        arrow.fixed_update(0.5);
        assert_eq!(arrow.pos, Vec2::new(4.0, 0.0));
        assert_eq!(arrow.vel, Vec2::ZERO);
        assert!(!arrow.decide(1.0));
    }

    #[test]
    fn test_lifetime_expiry() {
        let mut arrow = Arrow::new(1, Vec2::ZERO, Vec2::X, 1.0);
        assert!(!arrow.decide(0.5));
        assert!(arrow.decide(0.5));
        // Stays expired
        assert!(arrow.decide(0.5));
    }

    #[test]
    fn test_player_contact_policy() {
        let mut arrow = Arrow::new(1, Vec2::ZERO, Vec2::X, 1.0);
        assert_eq!(
            arrow.touch_player(ArrowContactPolicy::LandedOnly),
            PlayerHit {
                lethal: true,
                destroy_arrow: false
            }
        );
        assert!(arrow.touch_player(ArrowContactPolicy::Always).destroy_arrow);

        arrow.land();
        let hit = arrow.touch_player(ArrowContactPolicy::LandedOnly);
        assert!(!hit.lethal);
        assert!(hit.destroy_arrow);
    }
}
