//! Player state machine
//!
//! Locomotion, ceiling hang, ladders, dagger strikes, stamina and stun.
//! `decide` runs on the variable decision tick, `fixed_update` on the
//! physics tick, and the contact handlers whenever the physics collaborator
//! reports a collision or trigger.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, GroundProbe};
use super::clock::Countdown;
use super::tick::TickInput;
use crate::Facing;
use crate::consts::MOVING_THRESHOLD;
use crate::settings::{MeleeTuning, PlayerTuning};

/// How the player left the ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fall {
    Voluntary,
    /// Stamina ran out; the landing is loud and stuns
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerState {
    Grounded,
    /// In the air after a drop, a ladder dismount or a ledge
    Airborne { fall: Fall, air_attacked: bool },
    /// Rising toward a ceiling
    Climbing,
    Hanging,
    LadderClimbing,
    /// Ground strike in progress; blocks movement and input
    Attacking { elapsed: f32 },
    Stunned(Countdown),
    Dead,
}

/// Noise produced by a landing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Dismounted a ladder, no noise
    Silent,
    Quiet,
    /// Exhausted drop: wide noise and a stun
    Heavy,
}

/// Side effects of a decision tick the world has to carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCue {
    GroundStrike,
    GroundStrikeEnded,
    AirStrike,
    StunOver,
}

/// Boolean animation signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerAnim {
    pub moving: bool,
    pub grounded: bool,
    pub hanging: bool,
    pub climbing: bool,
    pub dead: bool,
    pub facing: Facing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub state: PlayerState,
    pub stamina: f32,
    pub max_stamina: f32,
    pub facing: Facing,
    /// Ladder zone the player is standing in (id into the world's ladders)
    pub nearby_ladder: Option<u32>,
    /// Set on ladder dismount so the following landing is silent
    pub skip_landing_noise: bool,
}

impl Player {
    pub fn new(pos: Vec2, tuning: &PlayerTuning) -> Self {
        Self {
            body: Body::at(pos, tuning.normal_gravity),
            state: PlayerState::Grounded,
            stamina: tuning.max_stamina,
            max_stamina: tuning.max_stamina,
            facing: Facing::Right,
            nearby_ladder: None,
            skip_landing_noise: false,
        }
    }

    pub fn is_grounded(&self) -> bool {
        matches!(
            self.state,
            PlayerState::Grounded | PlayerState::Attacking { .. } | PlayerState::Stunned(_)
        )
    }

    pub fn is_hanging(&self) -> bool {
        matches!(self.state, PlayerState::Hanging)
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.state, PlayerState::Dead)
    }

    pub fn is_stunned(&self) -> bool {
        matches!(self.state, PlayerState::Stunned(_))
    }

    /// Remaining stun as a fraction of its duration
    pub fn stun_ratio(&self) -> Option<f32> {
        match self.state {
            PlayerState::Stunned(timer) => Some(timer.ratio()),
            _ => None,
        }
    }

    /// Local offset of the ground-strike hitbox: out to `reach` over the first
    /// half of the strike, back over the second
    pub fn strike_offset(&self, melee: &MeleeTuning) -> Option<Vec2> {
        let PlayerState::Attacking { elapsed } = self.state else {
            return None;
        };
        let half = melee.ground_duration * 0.5;
        let end = self.facing.unit() * melee.ground_reach;
        let offset = if elapsed < half {
            crate::lerp_clamped(Vec2::ZERO, end, elapsed / half)
        } else {
            crate::lerp_clamped(end, Vec2::ZERO, (elapsed - half) / half)
        };
        Some(offset)
    }

    /// Decision tick: timers, input edges and stamina.
    ///
    /// `ladder_center` is the centre x of `nearby_ladder`, resolved by the world.
    pub fn decide(
        &mut self,
        input: &TickInput,
        ladder_center: Option<f32>,
        tuning: &PlayerTuning,
        melee: &MeleeTuning,
        dt: f32,
    ) -> Option<PlayerCue> {
        match &mut self.state {
            PlayerState::Dead => return None,
            PlayerState::Stunned(timer) => {
                if timer.advance(dt) {
                    self.state = PlayerState::Grounded;
                    log::debug!("Player recovered from stun");
                    return Some(PlayerCue::StunOver);
                }
                return None;
            }
            PlayerState::Attacking { elapsed } => {
                *elapsed += dt;
                let done = *elapsed >= melee.ground_duration;
                self.update_stamina(input, tuning, dt);
                if done {
                    self.state = PlayerState::Grounded;
                    return Some(PlayerCue::GroundStrikeEnded);
                }
                return None;
            }
            _ => {}
        }

        let mut cue = None;

        // Ladder mount
        if matches!(self.state, PlayerState::Grounded) && input.vertical != 0.0 {
            if let Some(center_x) = ladder_center {
                if (self.body.pos.x - center_x).abs() <= tuning.ladder_snap_tolerance {
                    self.start_ladder(center_x);
                }
            }
        }

        if input.attack {
            match self.state {
                PlayerState::Grounded => {
                    self.state = PlayerState::Attacking { elapsed: 0.0 };
                    self.body.vel = Vec2::ZERO;
                    cue = Some(PlayerCue::GroundStrike);
                }
                PlayerState::Airborne {
                    fall,
                    air_attacked: false,
                } => {
                    self.state = PlayerState::Airborne {
                        fall,
                        air_attacked: true,
                    };
                    cue = Some(PlayerCue::AirStrike);
                }
                _ => {}
            }
        }

        if input.interact {
            match self.state {
                PlayerState::Hanging => self.drop_from_ceiling(Fall::Voluntary, tuning),
                PlayerState::Grounded => self.start_climb(tuning),
                _ => {}
            }
        }

        self.update_stamina(input, tuning, dt);

        cue
    }

    /// Recover on the ground, drain while shuffling along a ceiling; an empty
    /// tank drops the player in the same tick
    fn update_stamina(&mut self, input: &TickInput, tuning: &PlayerTuning, dt: f32) {
        if self.is_grounded() {
            self.stamina += tuning.stamina_recovery_rate * dt;
        } else if self.is_hanging() && input.horizontal != 0.0 {
            self.stamina -= tuning.stamina_drain_rate * dt;
        }
        self.stamina = self.stamina.clamp(0.0, self.max_stamina);

        if self.is_hanging() && self.stamina <= 0.0 {
            self.drop_from_ceiling(Fall::Forced, tuning);
        }
    }

    /// Physics tick: velocity commands
    pub fn fixed_update(
        &mut self,
        input: &TickInput,
        probe: &impl GroundProbe,
        tuning: &PlayerTuning,
    ) {
        match self.state {
            PlayerState::LadderClimbing => self.ladder_movement(input, probe, tuning),
            PlayerState::Airborne { .. } => self.body.set_vel_x(0.0),
            PlayerState::Grounded | PlayerState::Hanging => {
                if let Some(facing) = Facing::from_dx(input.horizontal) {
                    self.facing = facing;
                }
                let speed = if self.is_hanging() {
                    tuning.hang_speed
                } else {
                    tuning.ground_speed
                };
                self.body.set_vel_x(input.horizontal * speed);
            }
            PlayerState::Climbing
            | PlayerState::Attacking { .. }
            | PlayerState::Stunned(_)
            | PlayerState::Dead => {}
        }
    }

    fn ladder_movement(&mut self, input: &TickInput, probe: &impl GroundProbe, tuning: &PlayerTuning) {
        let origin = Vec2::new(self.body.pos.x, self.body.pos.y - tuning.feet_offset);
        let on_ground = probe.ground_below(origin, tuning.ground_probe_length);

        if on_ground && input.horizontal != 0.0 {
            // Walk straight off the ladder. No landing follows, so the silence
            // flag set by stop_ladder would otherwise mute the next real fall.
            self.stop_ladder(tuning);
            self.skip_landing_noise = false;
            self.state = PlayerState::Grounded;
            if let Some(facing) = Facing::from_dx(input.horizontal) {
                self.facing = facing;
            }
            self.body.set_vel_x(input.horizontal * tuning.ground_speed);
            log::debug!("Player stepped off ladder onto ground");
            return;
        }

        self.body.vel = Vec2::new(0.0, input.vertical * tuning.climb_speed);
    }

    fn start_ladder(&mut self, center_x: f32) {
        self.state = PlayerState::LadderClimbing;
        self.body.gravity_scale = 0.0;
        self.body.vel = Vec2::ZERO;
        self.body.pos.x = center_x;
        self.body.ignore_ground = true;
        log::debug!("Player mounted ladder at x={center_x}");
    }

    fn stop_ladder(&mut self, tuning: &PlayerTuning) {
        self.body.gravity_scale = tuning.normal_gravity;
        self.body.vel = Vec2::ZERO;
        self.body.ignore_ground = false;
        self.skip_landing_noise = true;
        self.state = PlayerState::Airborne {
            fall: Fall::Voluntary,
            air_attacked: false,
        };
    }

    fn start_climb(&mut self, tuning: &PlayerTuning) {
        self.state = PlayerState::Climbing;
        self.body.gravity_scale = 0.0;
        self.body.vel = Vec2::new(0.0, tuning.climb_speed);
        log::debug!("Player climbing");
    }

    fn drop_from_ceiling(&mut self, fall: Fall, tuning: &PlayerTuning) {
        self.state = PlayerState::Airborne {
            fall,
            air_attacked: false,
        };
        match fall {
            Fall::Forced => {
                self.body.gravity_scale = tuning.heavy_gravity;
                self.body.set_vel_x(0.0);
            }
            Fall::Voluntary => {
                self.body.gravity_scale = tuning.normal_gravity;
                self.body.vel = Vec2::new(0.0, -tuning.drop_nudge);
            }
        }
        log::debug!("Player dropped from ceiling ({fall:?})");
    }

    /// Collision with a ceiling surface
    pub fn touch_ceiling(&mut self) {
        if matches!(self.state, PlayerState::Climbing) {
            self.state = PlayerState::Hanging;
            self.body.vel = Vec2::ZERO;
            self.body.gravity_scale = 0.0;
            log::debug!("Player hanging");
        }
    }

    /// Collision with a ground surface. `None` if this wasn't a landing.
    pub fn touch_ground(&mut self, tuning: &PlayerTuning) -> Option<Landing> {
        let fall = match self.state {
            PlayerState::Airborne { fall, .. } => fall,
            PlayerState::Climbing | PlayerState::Hanging => Fall::Voluntary,
            _ => return None,
        };

        self.body.gravity_scale = tuning.normal_gravity;
        self.state = PlayerState::Grounded;

        if self.skip_landing_noise {
            self.skip_landing_noise = false;
            return Some(Landing::Silent);
        }
        match fall {
            Fall::Forced => {
                self.state = PlayerState::Stunned(Countdown::start(tuning.stun_duration));
                self.body.vel = Vec2::ZERO;
                log::debug!("Player stunned by heavy landing");
                Some(Landing::Heavy)
            }
            Fall::Voluntary => Some(Landing::Quiet),
        }
    }

    pub fn enter_ladder_zone(&mut self, ladder: u32) {
        self.nearby_ladder = Some(ladder);
    }

    pub fn exit_ladder_zone(&mut self, ladder: u32, tuning: &PlayerTuning) {
        if self.nearby_ladder == Some(ladder) {
            self.nearby_ladder = None;
        }
        if matches!(self.state, PlayerState::LadderClimbing) {
            self.stop_ladder(tuning);
            log::debug!("Player left ladder zone");
        }
    }

    /// Terminal transition. Returns false if already dead.
    pub fn die(&mut self, tuning: &PlayerTuning) -> bool {
        if self.is_dead() {
            return false;
        }
        self.state = PlayerState::Dead;
        self.body.vel = Vec2::ZERO;
        self.body.gravity_scale = tuning.normal_gravity;
        self.body.ignore_ground = false;
        true
    }

    pub fn anim(&self) -> PlayerAnim {
        PlayerAnim {
            moving: self.body.vel.x.abs() > MOVING_THRESHOLD,
            grounded: self.is_grounded(),
            hanging: self.is_hanging(),
            climbing: matches!(
                self.state,
                PlayerState::Climbing | PlayerState::LadderClimbing
            ),
            dead: self.is_dead(),
            facing: self.facing,
        }
    }
}
