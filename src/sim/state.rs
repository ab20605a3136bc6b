//! World state
//!
//! Owns every entity of a running level plus the outgoing event queue.
//! Entity vectors stay sorted by id so iteration order is deterministic.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arrow::{Arrow, launch_velocity};
use super::enemy::{Enemy, EnemyCue, PlayerView};
use super::events::{
    AnimTrigger, DeathCause, EntityRef, EventQueue, GameEvent, SceneChange, Spawn,
};
use super::melee::{MeleeHitbox, StrikeKind};
use super::noise::{NoiseBurst, NoiseSignal, burst_volumes};
use super::player::{Landing, Player, PlayerCue};
use crate::Facing;
use crate::settings::{LadderZone, LevelData, Settings};

/// Current phase of the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelPhase {
    Playing,
    /// Player died
    Failed,
    /// No archer left standing
    Cleared,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ladder {
    pub id: u32,
    pub zone: LadderZone,
}

/// Complete level state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub settings: Settings,
    pub phase: LevelPhase,
    /// Seconds of decision time simulated
    pub elapsed: f32,
    pub player: Player,
    /// Archers (sorted by id)
    pub enemies: Vec<Enemy>,
    pub arrows: Vec<Arrow>,
    pub noises: Vec<NoiseSignal>,
    pub melee: Vec<MeleeHitbox>,
    pub ladders: Vec<Ladder>,
    /// A stun gauge is currently shown over the player
    pub stun_gauge_shown: bool,
    #[serde(skip)]
    events: EventQueue,
    next_id: u32,
}

impl GameState {
    /// Build a level from tuning and level data
    pub fn new(settings: Settings, level: &LevelData) -> Self {
        let player = Player::new(level.player_spawn, &settings.player);
        let mut state = Self {
            settings,
            phase: LevelPhase::Playing,
            elapsed: 0.0,
            player,
            enemies: Vec::new(),
            arrows: Vec::new(),
            noises: Vec::new(),
            melee: Vec::new(),
            ladders: Vec::new(),
            stun_gauge_shown: false,
            events: EventQueue::new(),
            next_id: 1,
        };

        for spawn in &level.enemies {
            let id = state.next_entity_id();
            let enemy = Enemy::new(id, spawn.pos, spawn.start_direction, &state.settings.enemy);
            state.enemies.push(enemy);
        }
        for zone in &level.ladders {
            let id = state.next_entity_id();
            state.ladders.push(Ladder {
                id,
                zone: zone.clone(),
            });
        }

        log::info!(
            "Level started: {} archers, {} ladders",
            state.enemies.len(),
            state.ladders.len()
        );
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn events(&self) -> &[GameEvent] {
        self.events.as_slice()
    }

    /// Hand pending events to the collaborators
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain().collect()
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn is_playing(&self) -> bool {
        self.phase == LevelPhase::Playing
    }

    pub fn living_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| !e.is_dead()).count()
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn ladder(&self, id: u32) -> Option<&Ladder> {
        self.ladders.iter().find(|l| l.id == id)
    }

    /// Centre of the ladder the player is standing in, if it still exists
    pub fn nearby_ladder_center(&self) -> Option<f32> {
        let id = self.player.nearby_ladder?;
        self.ladder(id).map(|l| l.zone.center_x)
    }

    pub fn player_view(&self) -> PlayerView {
        PlayerView {
            pos: self.player.body.pos,
            hanging: self.player.is_hanging(),
        }
    }

    /// End the run. No-op if the player is already dead.
    pub fn kill_player(&mut self, cause: DeathCause) {
        if !self.player.die(&self.settings.player) {
            return;
        }
        self.hide_stun_gauge();
        self.emit(GameEvent::PlayerDied(cause));
        if self.phase == LevelPhase::Playing {
            self.phase = LevelPhase::Failed;
            self.emit(GameEvent::Scene(SceneChange::GameOver));
            log::info!("Game over ({cause:?})");
        }
    }

    /// Kill an archer. No-op if it is already dead or unknown.
    pub fn kill_enemy(&mut self, id: u32) {
        let mut cues = Vec::new();
        let killed = match self.enemy_mut(id) {
            Some(enemy) => enemy.kill(&mut cues),
            None => {
                log::warn!("Kill requested for unknown archer {id}");
                return;
            }
        };
        self.apply_enemy_cues(id, cues);
        if killed {
            self.emit(GameEvent::EnemyDied(id));
        }
    }

    /// Fire-point cue from an external animation. Looses at most one arrow
    /// per shoot cycle.
    pub fn enemy_fire_cue(&mut self, id: u32) {
        let view = self.player_view();
        let mut cues = Vec::new();
        if let Some(enemy) = self.enemy_mut(id) {
            enemy.fire_cue(&view, &mut cues);
        }
        self.apply_enemy_cues(id, cues);
    }

    /// Death-clip final-frame cue from an external animation
    pub fn enemy_death_final_frame(&mut self, id: u32) {
        let tuning = self.settings.enemy.clone();
        let mut cues = Vec::new();
        if let Some(enemy) = self.enemy_mut(id) {
            enemy.death_final_frame(&tuning, &mut cues);
        }
        self.apply_enemy_cues(id, cues);
    }

    pub(crate) fn apply_enemy_cues(&mut self, id: u32, cues: Vec<EnemyCue>) {
        for cue in cues {
            match cue {
                EnemyCue::AlertOn => self.emit(GameEvent::Spawned(Spawn::AlertMarker { enemy: id })),
                EnemyCue::AlertOff => self.emit(GameEvent::Despawned(EntityRef::AlertMarker(id))),
                EnemyCue::ShootStarted => self.emit(GameEvent::AnimTrigger {
                    entity: EntityRef::Enemy(id),
                    trigger: AnimTrigger::Shoot,
                }),
                EnemyCue::Fire { origin, facing } => self.spawn_arrow(origin, facing),
                EnemyCue::Expired => self.remove_enemy(id),
            }
        }
    }

    fn remove_enemy(&mut self, id: u32) {
        let before = self.enemies.len();
        self.enemies.retain(|e| e.id != id);
        if self.enemies.len() != before {
            self.emit(GameEvent::EnemyRemoved(id));
            self.emit(GameEvent::Despawned(EntityRef::Enemy(id)));
            log::info!("Archer {id} removed");
        }
    }

    fn spawn_arrow(&mut self, origin: Vec2, facing: Facing) {
        let Some(template) = self.settings.arrow.clone() else {
            log::warn!("No arrow template configured; shot skipped");
            return;
        };
        let id = self.next_entity_id();
        let vel = launch_velocity(template.velocity, facing);
        self.arrows.push(Arrow::new(id, origin, vel, template.lifetime));
        self.emit(GameEvent::Spawned(Spawn::Arrow {
            id,
            pos: origin,
            vel,
        }));
    }

    pub(crate) fn remove_arrow(&mut self, id: u32) {
        let before = self.arrows.len();
        self.arrows.retain(|a| a.id != id);
        if self.arrows.len() != before {
            self.emit(GameEvent::Despawned(EntityRef::Arrow(id)));
        }
    }

    pub(crate) fn apply_player_cue(&mut self, cue: PlayerCue) {
        let melee = self.settings.melee.clone();
        match cue {
            PlayerCue::GroundStrike => {
                let id = self.next_entity_id();
                self.melee.push(MeleeHitbox::ground(id, melee.ground_size));
                self.emit(GameEvent::Spawned(Spawn::MeleeHitbox {
                    id,
                    offset: Vec2::ZERO,
                    size: melee.ground_size,
                }));
                self.emit(GameEvent::AnimTrigger {
                    entity: EntityRef::Player,
                    trigger: AnimTrigger::Attack,
                });
            }
            PlayerCue::GroundStrikeEnded => {
                let ended: Vec<u32> = self
                    .melee
                    .iter()
                    .filter(|m| m.kind == StrikeKind::Ground)
                    .map(|m| m.id)
                    .collect();
                for id in ended {
                    self.remove_melee(id);
                }
            }
            PlayerCue::AirStrike => {
                let id = self.next_entity_id();
                self.melee.push(MeleeHitbox::air(
                    id,
                    melee.air_offset,
                    melee.air_size,
                    melee.air_lifetime,
                ));
                self.emit(GameEvent::Spawned(Spawn::MeleeHitbox {
                    id,
                    offset: melee.air_offset,
                    size: melee.air_size,
                }));
                self.emit(GameEvent::AnimTrigger {
                    entity: EntityRef::Player,
                    trigger: AnimTrigger::Attack,
                });
            }
            PlayerCue::StunOver => self.hide_stun_gauge(),
        }
    }

    pub(crate) fn remove_melee(&mut self, id: u32) {
        let before = self.melee.len();
        self.melee.retain(|m| m.id != id);
        if self.melee.len() != before {
            self.emit(GameEvent::Despawned(EntityRef::Melee(id)));
        }
    }

    /// Follow-up of a ground contact
    pub(crate) fn apply_landing(&mut self, landing: Landing) {
        match landing {
            Landing::Silent => {}
            Landing::Quiet => self.emit_noise(NoiseBurst::Narrow),
            Landing::Heavy => {
                self.emit_noise(NoiseBurst::Wide);
                if self.settings.stun_gauge {
                    self.stun_gauge_shown = true;
                    self.emit(GameEvent::Spawned(Spawn::StunGauge {
                        duration: self.settings.player.stun_duration,
                    }));
                } else {
                    log::warn!("Stun gauge disabled; stun has no visual countdown");
                }
            }
        }
    }

    fn hide_stun_gauge(&mut self) {
        if self.stun_gauge_shown {
            self.stun_gauge_shown = false;
            self.emit(GameEvent::Despawned(EntityRef::StunGauge));
        }
    }

    fn emit_noise(&mut self, burst: NoiseBurst) {
        let Some(tuning) = self.settings.noise.clone() else {
            log::warn!("No noise template configured; landing is silent");
            return;
        };
        let feet = self.player.body.pos - Vec2::new(0.0, self.settings.player.feet_offset);
        for (pos, size) in burst_volumes(feet, burst, &tuning) {
            let id = self.next_entity_id();
            self.noises
                .push(NoiseSignal::new(id, pos, size, tuning.lifetime));
            self.emit(GameEvent::Spawned(Spawn::Noise { id, pos, size }));
        }
        log::debug!("Landing noise {burst:?} at x={}", feet.x);
    }

    pub(crate) fn remove_noise(&mut self, id: u32) {
        let before = self.noises.len();
        self.noises.retain(|n| n.id != id);
        if self.noises.len() != before {
            self.emit(GameEvent::Despawned(EntityRef::Noise(id)));
        }
    }

    /// Level-clear watcher. Dead archers still count until their linger
    /// ends and they are removed.
    pub(crate) fn check_level_clear(&mut self) {
        if self.phase == LevelPhase::Playing && self.enemies.is_empty() {
            self.phase = LevelPhase::Cleared;
            self.emit(GameEvent::Scene(SceneChange::LevelClear));
            log::info!("Level clear after {:.2}s", self.elapsed);
        }
    }
}
