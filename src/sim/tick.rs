//! Simulation ticks
//!
//! Two entry points, matching the two clocks of the host engine:
//! `tick` runs per-frame decisions (timers, input edges, AI), and
//! `fixed_tick` runs velocity commands at the physics rate. Contacts
//! reported by the physics collaborator go through `contact::handle_contacts`.

use super::body::GroundProbe;
use super::melee::StrikeKind;
use super::state::GameState;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Horizontal axis in [-1, 1]
    pub horizontal: f32,
    /// Vertical axis in [-1, 1]; positive is up
    pub vertical: f32,
    /// Attack pressed this tick
    pub attack: bool,
    /// Interact pressed this tick
    pub interact: bool,
}

/// Decision tick
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if !state.is_playing() {
        return;
    }
    state.elapsed += dt;

    // Player
    let ladder_center = state.nearby_ladder_center();
    if state.player.nearby_ladder.is_some() && ladder_center.is_none() {
        log::warn!("Player references a ladder that no longer exists");
        state.player.nearby_ladder = None;
    }
    let cue = state.player.decide(
        input,
        ladder_center,
        &state.settings.player,
        &state.settings.melee,
        dt,
    );
    if let Some(cue) = cue {
        state.apply_player_cue(cue);
    }
    if let Some(offset) = state.player.strike_offset(&state.settings.melee) {
        for hitbox in state
            .melee
            .iter_mut()
            .filter(|m| m.kind == StrikeKind::Ground)
        {
            hitbox.offset = offset;
        }
    }

    // Archers, in id order
    let view = state.player_view();
    let mut pending = Vec::new();
    for enemy in &mut state.enemies {
        let mut cues = Vec::new();
        enemy.decide(&view, &state.settings.enemy, dt, &mut cues);
        if !cues.is_empty() {
            pending.push((enemy.id, cues));
        }
    }
    for (id, cues) in pending {
        state.apply_enemy_cues(id, cues);
    }

    // Short-lived volumes
    let expired: Vec<u32> = state
        .arrows
        .iter_mut()
        .filter_map(|a| a.decide(dt).then_some(a.id))
        .collect();
    for id in expired {
        state.remove_arrow(id);
    }

    let expired: Vec<u32> = state
        .noises
        .iter_mut()
        .filter_map(|n| n.decide(dt).then_some(n.id))
        .collect();
    for id in expired {
        state.remove_noise(id);
    }

    let expired: Vec<u32> = state
        .melee
        .iter_mut()
        .filter_map(|m| m.decide(dt).then_some(m.id))
        .collect();
    for id in expired {
        state.remove_melee(id);
    }

    state.check_level_clear();
}

/// Physics tick: velocity commands and kinematic motion
pub fn fixed_tick(state: &mut GameState, input: &TickInput, probe: &impl GroundProbe, dt: f32) {
    if !state.is_playing() {
        return;
    }
    state.player.fixed_update(input, probe, &state.settings.player);
    for enemy in &mut state.enemies {
        enemy.fixed_update(&state.settings.enemy);
    }
    for arrow in &mut state.arrows {
        arrow.fixed_update(dt);
    }
}
