//! Physics body handles shared with the physics collaborator
//!
//! The collaborator owns integration. It reads `vel`, `gravity_scale` and
//! `ignore_ground` after each fixed tick and writes back the solved `pos`
//! and `vel` before the next one.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub gravity_scale: f32,
    /// Pass through ground-layer colliders (ladder climbing)
    pub ignore_ground: bool,
}

impl Body {
    pub fn at(pos: Vec2, gravity_scale: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            gravity_scale,
            ignore_ground: false,
        }
    }

    /// Set horizontal velocity, keep vertical
    #[inline]
    pub fn set_vel_x(&mut self, vx: f32) {
        self.vel = Vec2::new(vx, self.vel.y);
    }
}

/// Short downward obstruction test against ground-like layers
pub trait GroundProbe {
    /// True if ground lies within `max_distance` straight below `origin`
    fn ground_below(&self, origin: Vec2, max_distance: f32) -> bool;
}

impl<F> GroundProbe for F
where
    F: Fn(Vec2, f32) -> bool,
{
    fn ground_below(&self, origin: Vec2, max_distance: f32) -> bool {
        self(origin, max_distance)
    }
}

/// Probe that never finds ground
pub struct NoGround;

impl GroundProbe for NoGround {
    fn ground_below(&self, _origin: Vec2, _max_distance: f32) -> bool {
        false
    }
}
