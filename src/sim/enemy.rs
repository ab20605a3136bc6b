//! Archer AI
//!
//! Patrols a fixed-length leg, turns toward noise, and when it sees the
//! player on its own floor it raises an alert, aims, and looses one arrow
//! per shoot cycle. Death plays out a clip, lingers, then the archer is
//! removed from the world.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::clock::Countdown;
use crate::Facing;
use crate::consts::{MIN_PATROL_DISTANCE, MOVING_THRESHOLD, PATROL_ARRIVE_EPSILON};
use crate::settings::EnemyTuning;

/// Origin and heading of the current patrol leg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatrolLeg {
    pub anchor: Vec2,
    pub direction: Facing,
}

impl PatrolLeg {
    /// Far end of the leg; y is pinned to the anchor
    pub fn target(&self, patrol_distance: f32) -> Vec2 {
        let reach = patrol_distance.max(MIN_PATROL_DISTANCE);
        Vec2::new(self.anchor.x + self.direction.sign() * reach, self.anchor.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyState {
    Patrol,
    Aim { elapsed: f32 },
    /// Shoot cycle; `fired` guards against a second arrow
    Shoot { elapsed: f32, fired: bool },
    Dead {
        clip_elapsed: f32,
        /// Started once the death clip reaches its final frame
        linger: Option<Countdown>,
    },
}

/// What the archer needs to know about the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub pos: Vec2,
    pub hanging: bool,
}

/// Side effects for the world to carry out
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyCue {
    AlertOn,
    AlertOff,
    ShootStarted,
    Fire { origin: Vec2, facing: Facing },
    /// Linger over; remove from the world
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyAnim {
    pub moving: bool,
    pub dead: bool,
    pub facing: Facing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub body: Body,
    pub state: EnemyState,
    pub leg: PatrolLeg,
    pub target: Vec2,
    pub facing: Facing,
    /// Leg to resume once the noise has been checked
    pub saved_leg: Option<PatrolLeg>,
    pub alerted: bool,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, start_direction: Facing, tuning: &EnemyTuning) -> Self {
        let leg = PatrolLeg {
            anchor: pos,
            direction: start_direction,
        };
        Self {
            id,
            body: Body::at(pos, 1.0),
            state: EnemyState::Patrol,
            leg,
            target: leg.target(tuning.patrol_distance),
            facing: start_direction,
            saved_leg: None,
            alerted: false,
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.state, EnemyState::Dead { .. })
    }

    pub fn is_investigating(&self) -> bool {
        self.saved_leg.is_some()
    }

    /// Same floor, in front, within radius, and not hanging from a ceiling
    pub fn sights(&self, player: &PlayerView, tuning: &EnemyTuning) -> bool {
        let delta = player.pos - self.body.pos;
        let same_floor = delta.y.abs() <= tuning.detect_height;
        let in_front = delta.x * self.facing.sign() > 0.0;
        let in_range = delta.x.abs() <= tuning.detect_radius;
        same_floor && in_front && in_range && !player.hanging
    }

    /// Decision tick
    pub fn decide(
        &mut self,
        player: &PlayerView,
        tuning: &EnemyTuning,
        dt: f32,
        cues: &mut Vec<EnemyCue>,
    ) {
        if let EnemyState::Dead {
            clip_elapsed,
            linger,
        } = &mut self.state
        {
            match linger {
                None => {
                    *clip_elapsed += dt;
                    if *clip_elapsed >= tuning.death_clip {
                        self.death_final_frame(tuning, cues);
                    }
                }
                Some(timer) => {
                    timer.advance(dt);
                    if timer.is_expired() {
                        cues.push(EnemyCue::Expired);
                    }
                }
            }
            return;
        }

        if matches!(self.state, EnemyState::Patrol) {
            if self.sights(player, tuning) {
                self.begin_aim(player, tuning, cues);
            } else {
                self.set_alert(false, cues);
            }
        }

        if let EnemyState::Aim { elapsed } = &mut self.state {
            if self.body.pos.distance(player.pos) > tuning.aim_break_distance {
                self.state = EnemyState::Patrol;
                self.set_alert(false, cues);
                log::debug!("Archer {} lost its target", self.id);
            } else {
                *elapsed += dt;
                if *elapsed >= tuning.aim_delay {
                    self.state = EnemyState::Shoot {
                        elapsed: 0.0,
                        fired: false,
                    };
                    cues.push(EnemyCue::ShootStarted);
                    self.advance_shot(player, tuning, 0.0, cues);
                    return;
                }
            }
        }

        if matches!(self.state, EnemyState::Shoot { .. }) {
            self.advance_shot(player, tuning, dt, cues);
        }
    }

    fn advance_shot(
        &mut self,
        player: &PlayerView,
        tuning: &EnemyTuning,
        dt: f32,
        cues: &mut Vec<EnemyCue>,
    ) {
        let EnemyState::Shoot { elapsed, fired } = &mut self.state else {
            return;
        };
        *elapsed += dt;
        let at = *elapsed;
        let fired = *fired;

        if !fired && at >= tuning.fire_point * tuning.shot_duration {
            self.fire_cue(player, cues);
        }
        if at >= tuning.shot_duration {
            // Cooldown over; detection resumes next tick
            self.state = EnemyState::Patrol;
        }
    }

    fn begin_aim(&mut self, player: &PlayerView, tuning: &EnemyTuning, cues: &mut Vec<EnemyCue>) {
        if let Some(saved) = self.saved_leg.take() {
            self.restore_leg(saved, tuning);
        }
        self.set_alert(true, cues);
        if let Some(facing) = Facing::from_dx(player.pos.x - self.body.pos.x) {
            self.facing = facing;
        }
        self.body.set_vel_x(0.0);
        self.state = EnemyState::Aim { elapsed: 0.0 };
        log::debug!("Archer {} spotted the player", self.id);
    }

    fn set_alert(&mut self, on: bool, cues: &mut Vec<EnemyCue>) {
        if self.alerted == on {
            return;
        }
        self.alerted = on;
        cues.push(if on { EnemyCue::AlertOn } else { EnemyCue::AlertOff });
    }

    /// Release point of the shoot cycle. Fires at most once per cycle; the
    /// archer re-faces the player first. Returns true if an arrow was loosed.
    pub fn fire_cue(&mut self, player: &PlayerView, cues: &mut Vec<EnemyCue>) -> bool {
        let EnemyState::Shoot { fired, .. } = &mut self.state else {
            return false;
        };
        if *fired {
            return false;
        }
        *fired = true;

        if let Some(facing) = Facing::from_dx(player.pos.x - self.body.pos.x) {
            self.facing = facing;
        }
        cues.push(EnemyCue::Fire {
            origin: self.body.pos,
            facing: self.facing,
        });
        log::debug!("Archer {} fired facing {:?}", self.id, self.facing);
        true
    }

    /// React to a noise volume. Ignored while aiming, shooting or dead.
    pub fn hear_noise(&mut self, noise_pos: Vec2, player_y: f32) -> bool {
        if !matches!(self.state, EnemyState::Patrol) {
            return false;
        }
        if self.saved_leg.is_none() {
            self.saved_leg = Some(self.leg);
        }
        let direction = Facing::from_dx(noise_pos.x - self.body.pos.x).unwrap_or(self.facing);
        self.leg = PatrolLeg {
            anchor: self.body.pos,
            direction,
        };
        self.facing = direction;
        self.target = Vec2::new(noise_pos.x, player_y);
        log::debug!("Archer {} investigating noise at x={}", self.id, noise_pos.x);
        true
    }

    fn restore_leg(&mut self, saved: PatrolLeg, tuning: &EnemyTuning) {
        self.leg = saved;
        self.facing = saved.direction;
        self.target = saved.target(tuning.patrol_distance);
    }

    /// Physics tick
    pub fn fixed_update(&mut self, tuning: &EnemyTuning) {
        let holding = self.alerted || !matches!(self.state, EnemyState::Patrol);
        if holding {
            self.body.set_vel_x(0.0);
            return;
        }
        self.patrol_move(tuning);
    }

    fn patrol_move(&mut self, tuning: &EnemyTuning) {
        let to_target_x = self.target.x - self.body.pos.x;

        if to_target_x.abs() < PATROL_ARRIVE_EPSILON {
            self.body.pos.x = self.target.x;
            self.body.set_vel_x(0.0);

            if let Some(saved) = self.saved_leg.take() {
                self.restore_leg(saved, tuning);
                log::debug!("Archer {} resuming patrol", self.id);
            } else {
                self.leg = PatrolLeg {
                    anchor: self.target,
                    direction: self.leg.direction.flipped(),
                };
                self.target = self.leg.target(tuning.patrol_distance);
            }
            return;
        }

        let dir = to_target_x.signum();
        self.body.set_vel_x(dir * tuning.speed);
        if let Some(facing) = Facing::from_dx(dir) {
            self.facing = facing;
        }
    }

    /// Terminal transition. Returns false if already dead.
    pub fn kill(&mut self, cues: &mut Vec<EnemyCue>) -> bool {
        if self.is_dead() {
            return false;
        }
        self.set_alert(false, cues);
        self.saved_leg = None;
        self.state = EnemyState::Dead {
            clip_elapsed: 0.0,
            linger: None,
        };
        self.body.vel = Vec2::ZERO;
        log::debug!("Archer {} killed", self.id);
        true
    }

    /// Death clip reached its last frame: start lingering. Idempotent.
    pub fn death_final_frame(&mut self, tuning: &EnemyTuning, cues: &mut Vec<EnemyCue>) {
        if let EnemyState::Dead { linger, .. } = &mut self.state {
            if linger.is_none() {
                let timer = Countdown::start(tuning.death_linger);
                if timer.is_expired() {
                    cues.push(EnemyCue::Expired);
                }
                *linger = Some(timer);
            }
        }
    }

    pub fn anim(&self) -> EnemyAnim {
        EnemyAnim {
            moving: self.body.vel.x.abs() > MOVING_THRESHOLD,
            dead: self.is_dead(),
            facing: self.facing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tuning() -> EnemyTuning {
        EnemyTuning::default()
    }

    fn archer(facing: Facing) -> Enemy {
        Enemy::new(1, Vec2::new(0.0, 0.75), facing, &tuning())
    }

    fn view(x: f32, y: f32) -> PlayerView {
        PlayerView {
            pos: Vec2::new(x, y),
            hanging: false,
        }
    }

    /// Stand-in for the physics collaborator: integrate horizontal velocity
    fn step(enemy: &mut Enemy, dt: f32) {
        enemy.fixed_update(&tuning());
        enemy.body.pos += enemy.body.vel * dt;
    }

    #[test]
    fn test_initial_target() {
        let e = archer(Facing::Left);
        assert_eq!(e.target, Vec2::new(-5.0, 0.75));
    }

    #[test]
    fn test_sighted_at_distance_four() {
        let mut e = archer(Facing::Right);
        let player = view(4.0, 0.75);
        assert!(e.sights(&player, &tuning()));

        let mut cues = Vec::new();
        e.decide(&player, &tuning(), 0.02, &mut cues);
        assert_eq!(cues, vec![EnemyCue::AlertOn]);
        assert!(matches!(e.state, EnemyState::Aim { .. }));
        assert!(e.alerted);
    }

    #[test]
    fn test_detection_needs_all_four() {
        let t = tuning();
        let e = archer(Facing::Right);
        assert!(e.sights(&view(4.0, 0.75), &t));
        // Different floor
        assert!(!e.sights(&view(4.0, 2.0), &t));
        // Behind
        assert!(!e.sights(&view(-4.0, 0.75), &t));
        // Too far
        assert!(!e.sights(&view(5.5, 0.75), &t));
        // Hanging
        let hanging = PlayerView {
            pos: Vec2::new(4.0, 0.75),
            hanging: true,
        };
        assert!(!e.sights(&hanging, &t));
    }

    #[test]
    fn test_aim_break() {
        let t = EnemyTuning {
            detect_radius: 5.0,
            aim_break_distance: 5.0,
            ..tuning()
        };
        let mut e = archer(Facing::Right);
        let mut cues = Vec::new();
        e.decide(&view(4.0, 0.75), &t, 0.02, &mut cues);
        cues.clear();

        e.decide(&view(6.0, 0.75), &t, 0.02, &mut cues);
        assert_eq!(e.state, EnemyState::Patrol);
        assert!(!e.alerted);
        assert_eq!(cues, vec![EnemyCue::AlertOff]);
    }

    #[test]
    fn test_full_shoot_cycle() {
        let t = tuning();
        let mut e = archer(Facing::Right);
        let player = view(3.0, 0.75);
        let mut cues = Vec::new();

        // Aim for 0.5s
        for _ in 0..2 {
            e.decide(&player, &t, 0.25, &mut cues);
        }
        assert!(cues.contains(&EnemyCue::ShootStarted));
        assert!(matches!(e.state, EnemyState::Shoot { fired: false, .. }));

        // Release at half the shot duration
        cues.clear();
        e.decide(&player, &t, 0.5, &mut cues);
        assert_eq!(
            cues,
            vec![EnemyCue::Fire {
                origin: Vec2::new(0.0, 0.75),
                facing: Facing::Right
            }]
        );

        // Cooldown ends, detection resumes
        cues.clear();
        e.decide(&player, &t, 0.5, &mut cues);
        assert_eq!(e.state, EnemyState::Patrol);
        assert!(cues.is_empty());
        e.decide(&player, &t, 0.02, &mut cues);
        assert!(matches!(e.state, EnemyState::Aim { .. }));
    }

    #[test]
    fn test_fire_cue_refaces_moving_target() {
        let mut e = archer(Facing::Right);
        e.state = EnemyState::Shoot {
            elapsed: 0.0,
            fired: false,
        };
        let mut cues = Vec::new();
        assert!(e.fire_cue(&view(-2.0, 0.75), &mut cues));
        assert_eq!(e.facing, Facing::Left);
        assert!(matches!(
            cues[0],
            EnemyCue::Fire {
                facing: Facing::Left,
                ..
            }
        ));
    }

    #[test]
    fn test_fire_cue_outside_shoot_is_noop() {
        let mut e = archer(Facing::Right);
        let mut cues = Vec::new();
        assert!(!e.fire_cue(&view(2.0, 0.75), &mut cues));
        assert!(cues.is_empty());
    }

    #[test]
    fn test_patrol_flip_snaps_and_pins_y() {
        let t = tuning();
        let mut e = archer(Facing::Right);
        e.body.pos.y = 0.9; // physics jitter
        e.body.pos.x = 4.98;
        e.fixed_update(&t);
        assert_eq!(e.body.pos.x, 5.0);
        assert_eq!(e.leg.direction, Facing::Left);
        assert_eq!(e.leg.anchor, Vec2::new(5.0, 0.75));
        assert_eq!(e.target, Vec2::new(0.0, 0.75));
    }

    #[test]
    fn test_holds_still_while_alerted() {
        let mut e = archer(Facing::Right);
        e.body.vel.x = 4.0;
        e.alerted = true;
        e.fixed_update(&tuning());
        assert_eq!(e.body.vel.x, 0.0);
    }

    #[test]
    fn test_noise_investigation_round_trip() {
        let mut e = archer(Facing::Left);
        let before = (e.leg, e.target);

        assert!(e.hear_noise(Vec2::new(3.0, 1.0), 0.75));
        assert!(e.is_investigating());
        assert_eq!(e.facing, Facing::Right);
        assert_eq!(e.target, Vec2::new(3.0, 0.75));

        for _ in 0..200 {
            step(&mut e, 0.02);
            if !e.is_investigating() {
                break;
            }
        }
        assert!(!e.is_investigating());
        assert_eq!((e.leg, e.target), before);
    }

    #[test]
    fn test_second_noise_keeps_first_snapshot() {
        let mut e = archer(Facing::Left);
        let original = e.leg;
        e.hear_noise(Vec2::new(3.0, 0.0), 0.75);
        e.body.pos.x = 1.0;
        e.hear_noise(Vec2::new(-2.0, 0.0), 0.75);
        assert_eq!(e.saved_leg, Some(original));
        assert_eq!(e.facing, Facing::Left);
    }

    #[test]
    fn test_sighting_cancels_investigation() {
        let t = tuning();
        let mut e = archer(Facing::Left);
        let original = e.leg;
        e.hear_noise(Vec2::new(3.0, 0.0), 0.75);

        let mut cues = Vec::new();
        e.decide(&view(2.0, 0.75), &t, 0.02, &mut cues);
        assert!(matches!(e.state, EnemyState::Aim { .. }));
        assert!(!e.is_investigating());
        assert_eq!(e.leg, original);
        assert_eq!(e.facing, Facing::Right);
    }

    #[test]
    fn test_noise_ignored_while_aiming() {
        let mut e = archer(Facing::Right);
        e.state = EnemyState::Aim { elapsed: 0.1 };
        assert!(!e.hear_noise(Vec2::new(-3.0, 0.0), 0.75));
        assert!(!e.is_investigating());
    }

    #[test]
    fn test_kill_is_idempotent_and_lingers() {
        let t = tuning();
        let mut e = archer(Facing::Right);
        let mut cues = Vec::new();
        e.decide(&view(2.0, 0.75), &t, 0.02, &mut cues);
        e.hear_noise(Vec2::ZERO, 0.0);
        cues.clear();

        assert!(e.kill(&mut cues));
        assert_eq!(cues, vec![EnemyCue::AlertOff]);
        assert!(!e.kill(&mut cues));
        assert_eq!(cues.len(), 1);
        assert!(!e.alerted);
        assert_eq!(e.body.vel, Vec2::ZERO);

        cues.clear();
        // Death clip (0.6s) then linger (1.0s)
        for _ in 0..3 {
            e.decide(&view(2.0, 0.75), &t, 0.25, &mut cues);
        }
        assert!(matches!(e.state, EnemyState::Dead { linger: Some(_), .. }));
        assert!(cues.is_empty());
        for _ in 0..4 {
            e.decide(&view(2.0, 0.75), &t, 0.25, &mut cues);
        }
        assert!(cues.contains(&EnemyCue::Expired));
    }

    #[test]
    fn test_external_final_frame_cue() {
        let t = tuning();
        let mut e = archer(Facing::Right);
        let mut cues = Vec::new();
        e.kill(&mut cues);
        e.death_final_frame(&t, &mut cues);
        let first = e.state;
        e.death_final_frame(&t, &mut cues);
        assert_eq!(e.state, first);
        assert!(cues.is_empty());
    }

    #[test]
    fn test_zero_linger_expires_at_final_frame() {
        let t = EnemyTuning {
            death_linger: 0.0,
            ..tuning()
        };
        let mut e = archer(Facing::Right);
        let mut cues = Vec::new();
        e.kill(&mut cues);
        e.death_final_frame(&t, &mut cues);
        assert_eq!(cues, vec![EnemyCue::Expired]);
    }

    proptest! {
        #[test]
        fn prop_flip_once_per_traversal(
            distance in 1.0f32..8.0,
            speed in 1.0f32..6.0,
            legs in 1usize..5,
        ) {
            let t = EnemyTuning { patrol_distance: distance, speed, ..tuning() };
            let mut e = Enemy::new(1, Vec2::new(0.0, 0.75), Facing::Right, &t);
            let dt = 0.005;
            let mut flips = 0usize;
            let mut last_dir = e.leg.direction;
            let mut travelled = 0.0f32;
            while flips < legs {
                let before = e.body.pos.x;
                e.fixed_update(&t);
                e.body.pos += e.body.vel * dt;
                travelled += (e.body.pos.x - before).abs();
                if e.leg.direction != last_dir {
                    flips += 1;
                    last_dir = e.leg.direction;
                    prop_assert_eq!(e.target.y, e.leg.anchor.y);
                    prop_assert_eq!(e.leg.anchor.y, 0.75);
                    // One flip per full leg
                    prop_assert!((travelled - distance * flips as f32).abs() < 0.2 * flips as f32);
                }
            }
        }

        #[test]
        fn prop_detection_requires_all_conditions(
            dx in -10.0f32..10.0,
            dy in -2.0f32..2.0,
            hanging in any::<bool>(),
            right in any::<bool>(),
        ) {
            let t = tuning();
            let e = archer(if right { Facing::Right } else { Facing::Left });
            let player = PlayerView { pos: e.body.pos + Vec2::new(dx, dy), hanging };
            let expected = dy.abs() <= t.detect_height
                && dx * e.facing.sign() > 0.0
                && dx.abs() <= t.detect_radius
                && !hanging;
            prop_assert_eq!(e.sights(&player, &t), expected);
        }

        #[test]
        fn prop_noise_restores_leg_exactly(
            noise_x in -10.0f32..10.0,
            start_x in -3.0f32..3.0,
            right in any::<bool>(),
        ) {
            let t = tuning();
            let facing = if right { Facing::Right } else { Facing::Left };
            let mut e = Enemy::new(1, Vec2::new(start_x, 0.75), facing, &t);
            let before = e.leg;
            e.hear_noise(Vec2::new(noise_x, 0.5), 0.75);
            let mut ticks = 0;
            while e.is_investigating() && ticks < 10_000 {
                step(&mut e, 0.01);
                ticks += 1;
            }
            prop_assert!(!e.is_investigating());
            prop_assert_eq!(e.leg, before);
            prop_assert_eq!(e.target, before.target(t.patrol_distance));
        }

        #[test]
        fn prop_one_arrow_per_cycle(
            extra_cues in 0usize..6,
            dts in prop::collection::vec(0.01f32..0.3, 1..30),
        ) {
            let t = tuning();
            let mut e = archer(Facing::Right);
            e.state = EnemyState::Shoot { elapsed: 0.0, fired: false };
            let player = view(2.0, 0.75);
            let mut cues = Vec::new();
            for dt in dts {
                if !matches!(e.state, EnemyState::Shoot { .. }) {
                    break;
                }
                for _ in 0..extra_cues {
                    e.fire_cue(&player, &mut cues);
                }
                e.decide(&player, &t, dt, &mut cues);
            }
            let fired = cues.iter().filter(|c| matches!(c, EnemyCue::Fire { .. })).count();
            prop_assert!(fired <= 1);
        }
    }
}
