//! Skulk - gameplay core for a 2D stealth platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, archers, arrows, noise, contacts)
//! - `settings`: Data-driven tuning and level data
//! - `hud`: Read-only gauges for the HUD collaborator
//! - `stage`: Minimal flat-floor physics collaborator for headless runs
//! - `logging`: Logger bootstrap for the binary

pub mod hud;
pub mod logging;
pub mod settings;
pub mod sim;
pub mod stage;

pub use hud::HudSnapshot;
pub use settings::{ConfigError, LevelData, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed physics timestep (50 Hz)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the clock will accept
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Downward acceleration at gravity scale 1 (units/s²)
    pub const GRAVITY: f32 = 9.81;

    /// Horizontal speed below which an entity counts as standing still
    pub const MOVING_THRESHOLD: f32 = 0.1;
    /// Horizontal distance at which a patrolling archer has arrived
    pub const PATROL_ARRIVE_EPSILON: f32 = 0.05;
    /// Patrol legs are never shorter than this
    pub const MIN_PATROL_DISTANCE: f32 = 0.01;
}

/// Horizontal facing of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1.0 for left, +1.0 for right
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Facing that points along `dx`, or `None` when `dx` is zero
    #[inline]
    pub fn from_dx(dx: f32) -> Option<Self> {
        if dx > 0.0 {
            Some(Facing::Right)
        } else if dx < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }

    /// Unit vector along the horizontal axis
    #[inline]
    pub fn unit(self) -> Vec2 {
        Vec2::new(self.sign(), 0.0)
    }
}

/// Move `from` toward `to` by linear interpolation, `t` clamped to [0, 1]
#[inline]
pub fn lerp_clamped(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    from.lerp(to, t.clamp(0.0, 1.0))
}
