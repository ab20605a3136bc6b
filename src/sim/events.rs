//! Outgoing events for the physics, animation and scene collaborators
//!
//! The sim pushes these during a tick; collaborators drain them once per frame.

use glam::Vec2;

/// Handle to anything the sim owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Player,
    Enemy(u32),
    Arrow(u32),
    Noise(u32),
    Melee(u32),
    /// The "!" over an archer, keyed by the archer's id
    AlertMarker(u32),
    /// The countdown gauge over a stunned player
    StunGauge,
}

/// One-shot spawn requests
#[derive(Debug, Clone, PartialEq)]
pub enum Spawn {
    Arrow { id: u32, pos: Vec2, vel: Vec2 },
    Noise { id: u32, pos: Vec2, size: Vec2 },
    /// Hitbox parented to the player at `offset`
    MeleeHitbox { id: u32, offset: Vec2, size: Vec2 },
    AlertMarker { enemy: u32 },
    StunGauge { duration: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimTrigger {
    Attack,
    Shoot,
}

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    EnemyContact,
    Hazard,
    Arrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneChange {
    GameOver,
    LevelClear,
}

/// Everything the sim tells the outside world
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Spawned(Spawn),
    Despawned(EntityRef),
    AnimTrigger { entity: EntityRef, trigger: AnimTrigger },
    PlayerDied(DeathCause),
    EnemyDied(u32),
    /// Linger finished; the archer is gone from the world
    EnemyRemoved(u32),
    Scene(SceneChange),
}

/// Events are pushed during a tick and drained by collaborators
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Pending events, oldest first
    pub fn as_slice(&self) -> &[GameEvent] {
        &self.events
    }
}
