//! Reference stage
//!
//! A small flat-floor physics collaborator for headless runs and tests.
//! It integrates bodies, snaps them to floors and ceilings, answers the
//! ground probe and reports contacts. Surfaces are infinitely thin
//! horizontal spans; there are no walls or slopes.

use std::collections::HashSet;

use glam::Vec2;

use crate::consts::GRAVITY;
use crate::settings::{LevelData, Region, Surface};
use crate::sim::{
    Collider, Contact, ContactKind, GameState, GroundProbe, TickInput, fixed_tick, handle_contacts,
};

/// Distance within which a body counts as resting on a surface
const CONTACT_EPSILON: f32 = 1e-3;
const PLAYER_HALF_WIDTH: f32 = 0.4;
const ENEMY_HALF: Vec2 = Vec2::new(0.4, 0.75);
const ARROW_HALF: Vec2 = Vec2::new(0.25, 0.05);

fn boxes_overlap(a: Vec2, a_half: Vec2, b: Vec2, b_half: Vec2) -> bool {
    let d = (a - b).abs();
    let reach = a_half + b_half;
    d.x <= reach.x && d.y <= reach.y
}

pub struct Stage {
    floors: Vec<Surface>,
    ceilings: Vec<Surface>,
    hazards: Vec<Region>,
    on_floor: bool,
    at_ceiling: bool,
    /// Trigger pairs overlapping after the previous step, in report order
    touching: Vec<(Collider, Collider)>,
}

impl Stage {
    pub fn new(level: &LevelData) -> Self {
        Self {
            floors: level.floors.clone(),
            ceilings: level.ceilings.clone(),
            hazards: level.hazards.clone(),
            on_floor: false,
            at_ceiling: false,
            touching: Vec::new(),
        }
    }

    /// One physics substep: velocity commands, integration, contacts
    pub fn substep(&mut self, state: &mut GameState, input: &TickInput, dt: f32) {
        fixed_tick(state, input, &*self, dt);
        let contacts = self.step(state, dt);
        handle_contacts(state, &contacts);
    }

    /// Integrate bodies and collect the contacts this step produced
    pub fn step(&mut self, state: &mut GameState, dt: f32) -> Vec<Contact> {
        let mut contacts = Vec::new();
        let half = Vec2::new(PLAYER_HALF_WIDTH, state.settings.player.feet_offset);

        self.move_player(state, half, dt, &mut contacts);
        for enemy in &mut state.enemies {
            enemy.body.pos.x += enemy.body.vel.x * dt;
        }

        for arrow in state.arrows.iter().filter(|a| !a.landed) {
            let hits_surface =
                |s: &Surface| s.spans(arrow.pos.x) && (arrow.pos.y - s.y).abs() <= ARROW_HALF.y;
            if self.floors.iter().any(hits_surface) {
                contacts.push(Contact::begin(Collider::Arrow(arrow.id), Collider::Ground));
            } else if self.ceilings.iter().any(hits_surface) {
                contacts.push(Contact::begin(Collider::Arrow(arrow.id), Collider::Ceiling));
            }
        }

        let overlapping = self.overlaps(state, half);
        let now: HashSet<(Collider, Collider)> = overlapping.iter().copied().collect();
        let before: HashSet<(Collider, Collider)> = self.touching.iter().copied().collect();

        for &(subject, other) in &self.touching {
            if !now.contains(&(subject, other)) {
                contacts.push(Contact::exit(subject, other));
            }
        }
        for &(subject, other) in &overlapping {
            if !before.contains(&(subject, other)) {
                let kind = match other {
                    Collider::Enemy(_) if subject == Collider::Player => ContactKind::CollisionBegin,
                    _ => ContactKind::TriggerEnter,
                };
                contacts.push(Contact {
                    subject,
                    other,
                    kind,
                });
            }
        }
        self.touching = overlapping;

        contacts
    }

    fn move_player(&mut self, state: &mut GameState, half: Vec2, dt: f32, contacts: &mut Vec<Contact>) {
        let body = &mut state.player.body;
        let prev_feet = body.pos.y - half.y;
        let prev_head = body.pos.y + half.y;

        body.vel.y -= GRAVITY * body.gravity_scale * dt;
        body.pos += body.vel * dt;
        let x = body.pos.x;

        if !body.ignore_ground && body.vel.y <= 0.0 {
            let feet = body.pos.y - half.y;
            let landing = self
                .floors
                .iter()
                .filter(|f| f.spans(x) && prev_feet >= f.y - CONTACT_EPSILON && feet <= f.y)
                .max_by(|a, b| a.y.total_cmp(&b.y));
            if let Some(floor) = landing {
                body.pos.y = floor.y + half.y;
                body.vel.y = 0.0;
            }
        }
        if body.vel.y > 0.0 {
            let head = body.pos.y + half.y;
            let bump = self
                .ceilings
                .iter()
                .filter(|c| c.spans(x) && prev_head <= c.y + CONTACT_EPSILON && head >= c.y)
                .min_by(|a, b| a.y.total_cmp(&b.y));
            if let Some(ceiling) = bump {
                body.pos.y = ceiling.y - half.y;
                body.vel.y = 0.0;
            }
        }

        let feet = body.pos.y - half.y;
        let head = body.pos.y + half.y;
        let on_floor = !body.ignore_ground
            && self
                .floors
                .iter()
                .any(|f| f.spans(x) && (feet - f.y).abs() <= CONTACT_EPSILON);
        let at_ceiling = self
            .ceilings
            .iter()
            .any(|c| c.spans(x) && (head - c.y).abs() <= CONTACT_EPSILON);

        if on_floor && !self.on_floor {
            contacts.push(Contact::begin(Collider::Player, Collider::Ground));
        }
        if at_ceiling && !self.at_ceiling {
            contacts.push(Contact::begin(Collider::Player, Collider::Ceiling));
        }
        self.on_floor = on_floor;
        self.at_ceiling = at_ceiling;
    }

    fn overlaps(&self, state: &GameState, half: Vec2) -> Vec<(Collider, Collider)> {
        let mut pairs = Vec::new();
        let player = state.player.body.pos;

        for ladder in &state.ladders {
            let zone = &ladder.zone;
            let inside = (player.x - zone.center_x).abs() <= zone.half_width
                && player.y >= zone.bottom
                && player.y <= zone.top;
            if inside {
                pairs.push((Collider::Player, Collider::Ladder(ladder.id)));
            }
        }
        if self.hazards.iter().any(|h| h.contains(player)) {
            pairs.push((Collider::Player, Collider::Hazard));
        }
        for enemy in &state.enemies {
            if boxes_overlap(player, half, enemy.body.pos, ENEMY_HALF) {
                pairs.push((Collider::Player, Collider::Enemy(enemy.id)));
            }
        }
        for arrow in &state.arrows {
            if boxes_overlap(player, half, arrow.pos, ARROW_HALF) {
                pairs.push((Collider::Player, Collider::Arrow(arrow.id)));
            }
        }
        for hitbox in &state.melee {
            for enemy in &state.enemies {
                if hitbox.overlaps(player, enemy.body.pos, ENEMY_HALF) {
                    pairs.push((Collider::Melee(hitbox.id), Collider::Enemy(enemy.id)));
                }
            }
        }
        for enemy in &state.enemies {
            for noise in &state.noises {
                if boxes_overlap(enemy.body.pos, ENEMY_HALF, noise.pos, noise.size * 0.5) {
                    pairs.push((Collider::Enemy(enemy.id), Collider::Noise(noise.id)));
                }
            }
        }
        pairs
    }
}

impl GroundProbe for Stage {
    fn ground_below(&self, origin: Vec2, max_distance: f32) -> bool {
        self.floors.iter().any(|f| {
            f.spans(origin.x) && f.y <= origin.y + CONTACT_EPSILON && origin.y - f.y <= max_distance
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Facing;
    use crate::consts::SIM_DT;
    use crate::settings::{EnemySpawn, LadderZone, Settings};
    use crate::sim::{
        DeathCause, EntityRef, GameEvent, LevelPhase, PlayerState, SceneChange, Spawn, tick,
    };
    use crate::HudSnapshot;

    fn span(y: f32) -> Surface {
        Surface {
            y,
            min_x: -50.0,
            max_x: 50.0,
        }
    }

    /// Floor at 0, ceiling at 4, one archer far behind the player
    fn room() -> LevelData {
        LevelData {
            player_spawn: Vec2::new(0.0, 0.75),
            enemies: vec![EnemySpawn {
                pos: Vec2::new(-40.0, 0.75),
                start_direction: Facing::Left,
            }],
            floors: vec![span(0.0)],
            ceilings: vec![span(4.0)],
            ..Default::default()
        }
    }

    fn frame(stage: &mut Stage, state: &mut GameState, input: &TickInput) {
        stage.substep(state, input, SIM_DT);
        tick(state, input, SIM_DT);
    }

    #[test]
    fn test_falling_player_lands_once() {
        let mut level = room();
        level.player_spawn = Vec2::new(0.0, 2.0);
        let mut state = GameState::new(Settings::default(), &level);
        let mut stage = Stage::new(&level);

        let mut landings = 0;
        for _ in 0..100 {
            fixed_tick(&mut state, &TickInput::default(), &stage, SIM_DT);
            let contacts = stage.step(&mut state, SIM_DT);
            landings += contacts
                .iter()
                .filter(|c| **c == Contact::begin(Collider::Player, Collider::Ground))
                .count();
        }
        assert_eq!(landings, 1);
        assert!((state.player.body.pos.y - 0.75).abs() < 1e-4);
    }

    #[test]
    fn test_ground_probe() {
        let stage = Stage::new(&room());
        assert!(stage.ground_below(Vec2::new(0.0, 0.05), 0.1));
        assert!(!stage.ground_below(Vec2::new(0.0, 0.5), 0.1));
        assert!(!stage.ground_below(Vec2::new(60.0, 0.0), 0.1));
    }

    #[test]
    fn test_exhausted_hang_ends_in_heavy_landing() {
        let level = room();
        let mut state = GameState::new(Settings::default(), &level);
        let mut stage = Stage::new(&level);

        let climb = TickInput {
            interact: true,
            ..Default::default()
        };
        frame(&mut stage, &mut state, &climb);
        assert_eq!(state.player.state, PlayerState::Climbing);

        let idle = TickInput::default();
        for _ in 0..40 {
            frame(&mut stage, &mut state, &idle);
        }
        assert_eq!(state.player.state, PlayerState::Hanging);

        // Shuffle along until the tank runs dry
        let shuffle = TickInput {
            horizontal: 1.0,
            ..Default::default()
        };
        let mut ticks = 0;
        while !state.player.is_stunned() && ticks < 600 {
            frame(&mut stage, &mut state, &shuffle);
            ticks += 1;
        }
        assert!(state.player.is_stunned());

        let events = state.drain_events();
        let wide = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Spawned(Spawn::Noise { size, .. }) if size.x == 7.0))
            .count();
        assert_eq!(wide, 2);
        assert!(events.contains(&GameEvent::Spawned(Spawn::StunGauge { duration: 1.0 })));

        let mut last = 1.0;
        while let Some(ratio) = HudSnapshot::capture(&state).stun_ratio {
            assert!(ratio <= last);
            last = ratio;
            frame(&mut stage, &mut state, &idle);
        }
        assert_eq!(state.player.state, PlayerState::Grounded);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::Despawned(EntityRef::StunGauge))
        );
    }

    #[test]
    fn test_ladder_dismount_lands_silently() {
        let mut level = room();
        level.ceilings.clear();
        level.player_spawn = Vec2::new(2.0, 0.75);
        level.ladders.push(LadderZone {
            center_x: 2.1,
            half_width: 0.5,
            bottom: 0.0,
            top: 3.0,
        });
        let mut state = GameState::new(Settings::default(), &level);
        let mut stage = Stage::new(&level);

        let up = TickInput {
            vertical: 1.0,
            ..Default::default()
        };
        frame(&mut stage, &mut state, &up);
        assert_eq!(state.player.state, PlayerState::LadderClimbing);
        assert_eq!(state.player.body.pos.x, 2.1);

        let mut ticks = 0;
        while state.player.state == PlayerState::LadderClimbing && ticks < 200 {
            frame(&mut stage, &mut state, &up);
            ticks += 1;
        }
        assert!(matches!(state.player.state, PlayerState::Airborne { .. }));

        let idle = TickInput::default();
        for _ in 0..100 {
            frame(&mut stage, &mut state, &idle);
        }
        assert_eq!(state.player.state, PlayerState::Grounded);
        assert!(
            !state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::Spawned(Spawn::Noise { .. })))
        );
    }

    #[test]
    fn test_archer_shoots_player_dead() {
        let mut level = room();
        level.enemies[0] = EnemySpawn {
            pos: Vec2::new(4.0, 0.75),
            start_direction: Facing::Left,
        };
        let mut state = GameState::new(Settings::default(), &level);
        let mut stage = Stage::new(&level);

        let idle = TickInput::default();
        for _ in 0..200 {
            frame(&mut stage, &mut state, &idle);
        }
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PlayerDied(DeathCause::Arrow)));
        assert!(events.contains(&GameEvent::Scene(SceneChange::GameOver)));
        assert_eq!(state.phase, LevelPhase::Failed);
    }

    #[test]
    fn test_dagger_clears_level() {
        let mut level = room();
        level.enemies[0] = EnemySpawn {
            pos: Vec2::new(1.5, 0.75),
            start_direction: Facing::Left,
        };
        let mut state = GameState::new(Settings::default(), &level);
        let mut stage = Stage::new(&level);

        let attack = TickInput {
            attack: true,
            ..Default::default()
        };
        frame(&mut stage, &mut state, &attack);
        let idle = TickInput::default();
        for _ in 0..30 {
            frame(&mut stage, &mut state, &idle);
        }
        assert!(state.enemies[0].is_dead());
        assert_eq!(state.phase, LevelPhase::Playing);

        // Death clip and linger
        for _ in 0..90 {
            frame(&mut stage, &mut state, &idle);
        }
        assert_eq!(state.phase, LevelPhase::Cleared);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::Scene(SceneChange::LevelClear))
        );
    }
}
