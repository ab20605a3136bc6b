//! Dagger hitboxes
//!
//! Both strikes are children of the player. The ground strike's offset is
//! driven by the player's strike tween; the air strike hangs below the player
//! until its own countdown runs out.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::Countdown;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StrikeKind {
    Ground,
    Air(Countdown),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeleeHitbox {
    pub id: u32,
    pub kind: StrikeKind,
    /// Offset from the player's position
    pub offset: Vec2,
    pub size: Vec2,
}

impl MeleeHitbox {
    pub fn ground(id: u32, size: Vec2) -> Self {
        Self {
            id,
            kind: StrikeKind::Ground,
            offset: Vec2::ZERO,
            size,
        }
    }

    pub fn air(id: u32, offset: Vec2, size: Vec2, lifetime: f32) -> Self {
        Self {
            id,
            kind: StrikeKind::Air(Countdown::start(lifetime)),
            offset,
            size,
        }
    }

    /// Advance an air strike. Returns true once it should be removed.
    pub fn decide(&mut self, dt: f32) -> bool {
        match &mut self.kind {
            StrikeKind::Ground => false,
            StrikeKind::Air(timer) => {
                timer.advance(dt);
                timer.is_expired()
            }
        }
    }

    pub fn world_pos(&self, player_pos: Vec2) -> Vec2 {
        player_pos + self.offset
    }

    /// Axis-aligned overlap with a box centred at `center`
    pub fn overlaps(&self, player_pos: Vec2, center: Vec2, half_extents: Vec2) -> bool {
        let d = (self.world_pos(player_pos) - center).abs();
        let reach = self.size * 0.5 + half_extents;
        d.x <= reach.x && d.y <= reach.y
    }
}
