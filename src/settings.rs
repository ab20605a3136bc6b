//! Game tuning and level data
//!
//! Loaded from JSON. Every field has a default so partial files are fine.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Facing;

/// Errors raised while loading settings or level data
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Player locomotion, stamina and stun tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub ground_speed: f32,
    pub hang_speed: f32,
    pub climb_speed: f32,
    pub max_stamina: f32,
    /// Stamina regained per second while grounded
    pub stamina_recovery_rate: f32,
    /// Stamina lost per second while shuffling along a ceiling
    pub stamina_drain_rate: f32,
    pub normal_gravity: f32,
    /// Gravity scale after an exhausted drop
    pub heavy_gravity: f32,
    pub stun_duration: f32,
    /// Downward speed given on a voluntary drop
    pub drop_nudge: f32,
    /// Max horizontal distance from a ladder centre to mount it
    pub ladder_snap_tolerance: f32,
    /// Distance from body centre to feet
    pub feet_offset: f32,
    pub ground_probe_length: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            ground_speed: 5.0,
            hang_speed: 3.0,
            climb_speed: 8.0,
            max_stamina: 4.0,
            stamina_recovery_rate: 0.5,
            stamina_drain_rate: 1.0,
            normal_gravity: 2.0,
            heavy_gravity: 3.0,
            stun_duration: 1.0,
            drop_nudge: 1.0,
            ladder_snap_tolerance: 0.2,
            feet_offset: 0.75,
            ground_probe_length: 0.1,
        }
    }
}

/// Archer patrol, detection and firing tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub speed: f32,
    pub patrol_distance: f32,
    pub detect_radius: f32,
    /// Vertical tolerance for the same-floor test
    pub detect_height: f32,
    pub aim_delay: f32,
    /// Distance beyond which an aiming archer gives up
    pub aim_break_distance: f32,
    /// Length of the shoot cycle, after which detection resumes
    pub shot_duration: f32,
    /// Fraction of the shoot cycle at which the arrow is released
    pub fire_point: f32,
    /// Length of the death clip before the linger starts
    pub death_clip: f32,
    pub death_linger: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            speed: 4.0,
            patrol_distance: 5.0,
            detect_radius: 5.0,
            detect_height: 0.5,
            aim_delay: 0.5,
            aim_break_distance: 5.0,
            shot_duration: 1.0,
            fire_point: 0.5,
            death_clip: 0.6,
            death_linger: 1.0,
        }
    }
}

/// Arrow template
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowTuning {
    /// Launch velocity for a right-facing archer; x is mirrored when facing left
    pub velocity: Vec2,
    pub lifetime: f32,
}

impl Default for ArrowTuning {
    fn default() -> Self {
        Self {
            velocity: Vec2::new(8.0, 0.0),
            lifetime: 3.0,
        }
    }
}

/// Landing noise template
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseTuning {
    pub narrow_width: f32,
    pub wide_width: f32,
    pub height: f32,
    pub lifetime: f32,
    /// Offset of the volume centre above the feet
    pub vertical_offset: f32,
}

impl Default for NoiseTuning {
    fn default() -> Self {
        Self {
            narrow_width: 3.0,
            wide_width: 7.0,
            height: 0.5,
            lifetime: 0.3,
            vertical_offset: 0.25,
        }
    }
}

/// Dagger hitboxes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeTuning {
    pub ground_reach: f32,
    pub ground_duration: f32,
    pub ground_size: Vec2,
    pub air_offset: Vec2,
    pub air_size: Vec2,
    pub air_lifetime: f32,
}

impl Default for MeleeTuning {
    fn default() -> Self {
        Self {
            ground_reach: 1.0,
            ground_duration: 0.5,
            ground_size: Vec2::new(1.0, 0.2),
            air_offset: Vec2::new(0.0, -0.5),
            air_size: Vec2::new(0.1, 1.25),
            air_lifetime: 0.25,
        }
    }
}

/// What happens to an arrow that touches the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArrowContactPolicy {
    /// Any contact removes the arrow
    #[default]
    Always,
    /// Only arrows already stuck in a surface are removed; flying ones pass through
    LandedOnly,
}

/// Complete tuning set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    /// `None` disables firing (archers still aim)
    pub arrow: Option<ArrowTuning>,
    /// `None` makes landings silent
    pub noise: Option<NoiseTuning>,
    pub melee: MeleeTuning,
    pub arrow_player_contact: ArrowContactPolicy,
    /// Spawn a countdown gauge over a stunned player
    pub stun_gauge: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player: PlayerTuning::default(),
            enemy: EnemyTuning::default(),
            arrow: Some(ArrowTuning::default()),
            noise: Some(NoiseTuning::default()),
            melee: MeleeTuning::default(),
            arrow_player_contact: ArrowContactPolicy::Always,
            stun_gauge: true,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive number, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must not be negative, got {value}"),
        })
    }
}

impl Settings {
    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject values the simulation can't run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.player;
        positive("player.ground_speed", p.ground_speed)?;
        positive("player.hang_speed", p.hang_speed)?;
        positive("player.climb_speed", p.climb_speed)?;
        non_negative("player.max_stamina", p.max_stamina)?;
        non_negative("player.stamina_recovery_rate", p.stamina_recovery_rate)?;
        non_negative("player.stamina_drain_rate", p.stamina_drain_rate)?;
        positive("player.stun_duration", p.stun_duration)?;
        non_negative("player.ladder_snap_tolerance", p.ladder_snap_tolerance)?;

        let e = &self.enemy;
        positive("enemy.speed", e.speed)?;
        non_negative("enemy.patrol_distance", e.patrol_distance)?;
        non_negative("enemy.detect_radius", e.detect_radius)?;
        non_negative("enemy.detect_height", e.detect_height)?;
        non_negative("enemy.aim_delay", e.aim_delay)?;
        positive("enemy.shot_duration", e.shot_duration)?;
        non_negative("enemy.death_clip", e.death_clip)?;
        non_negative("enemy.death_linger", e.death_linger)?;
        if !(0.0..=1.0).contains(&e.fire_point) {
            return Err(ConfigError::Invalid {
                field: "enemy.fire_point",
                reason: format!("must lie in [0, 1], got {}", e.fire_point),
            });
        }

        if let Some(arrow) = &self.arrow {
            positive("arrow.lifetime", arrow.lifetime)?;
        }
        if let Some(noise) = &self.noise {
            positive("noise.lifetime", noise.lifetime)?;
            positive("noise.narrow_width", noise.narrow_width)?;
            positive("noise.wide_width", noise.wide_width)?;
        }
        positive("melee.ground_duration", self.melee.ground_duration)?;
        positive("melee.air_lifetime", self.melee.air_lifetime)?;
        Ok(())
    }
}

/// Where an archer starts and which way it first walks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub pos: Vec2,
    #[serde(default = "default_start_direction")]
    pub start_direction: Facing,
}

fn default_start_direction() -> Facing {
    Facing::Left
}

/// A climbable ladder column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadderZone {
    pub center_x: f32,
    /// Half-width of the trigger volume
    #[serde(default = "default_ladder_half_width")]
    pub half_width: f32,
    pub bottom: f32,
    pub top: f32,
}

fn default_ladder_half_width() -> f32 {
    0.5
}

/// Horizontal floor or ceiling span at height `y`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub y: f32,
    pub min_x: f32,
    pub max_x: f32,
}

impl Surface {
    pub fn spans(&self, x: f32) -> bool {
        x >= self.min_x && x <= self.max_x
    }
}

/// Axis-aligned kill zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Vec2,
    pub size: Vec2,
}

impl Region {
    pub fn contains(&self, point: Vec2) -> bool {
        let d = (point - self.center).abs();
        d.x <= self.size.x * 0.5 && d.y <= self.size.y * 0.5
    }
}

/// Entities and geometry placed at level start
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelData {
    pub player_spawn: Vec2,
    pub enemies: Vec<EnemySpawn>,
    pub ladders: Vec<LadderZone>,
    pub floors: Vec<Surface>,
    pub ceilings: Vec<Surface>,
    pub hazards: Vec<Region>,
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let level: LevelData = serde_json::from_str(json)?;
        for surface in level.floors.iter().chain(&level.ceilings) {
            if surface.max_x < surface.min_x {
                return Err(ConfigError::Invalid {
                    field: "surfaces.max_x",
                    reason: format!("span {}..{} is inverted", surface.min_x, surface.max_x),
                });
            }
        }
        for ladder in &level.ladders {
            if ladder.top < ladder.bottom {
                return Err(ConfigError::Invalid {
                    field: "ladders.top",
                    reason: format!("top {} below bottom {}", ladder.top, ladder.bottom),
                });
            }
        }
        Ok(level)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}
