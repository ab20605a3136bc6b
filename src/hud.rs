//! HUD read-outs
//!
//! A plain snapshot the HUD collaborator polls each frame.

use crate::sim::{GameState, LevelPhase};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudSnapshot {
    pub stamina: f32,
    pub max_stamina: f32,
    /// Stamina as a fraction of the maximum (0 when the maximum is 0)
    pub stamina_ratio: f32,
    /// The stamina bar is hidden while full
    pub stamina_visible: bool,
    /// Remaining stun, 1.0 on landing and 0.0 on recovery
    pub stun_ratio: Option<f32>,
    pub phase: LevelPhase,
    pub living_enemies: usize,
}

impl HudSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let player = &state.player;
        let stamina_ratio = if player.max_stamina > 0.0 {
            (player.stamina / player.max_stamina).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let stun_ratio = if state.settings.stun_gauge {
            player.stun_ratio()
        } else {
            None
        };

        Self {
            stamina: player.stamina,
            max_stamina: player.max_stamina,
            stamina_ratio,
            stamina_visible: stamina_ratio < 1.0,
            stun_ratio,
            phase: state.phase,
            living_enemies: state.living_enemy_count(),
        }
    }
}
