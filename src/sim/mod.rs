//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Timers advance only by the dt they are handed
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or engine dependencies; side effects leave as events

pub mod arrow;
pub mod body;
pub mod clock;
pub mod contact;
pub mod enemy;
pub mod events;
pub mod melee;
pub mod noise;
pub mod player;
pub mod state;
pub mod tick;

pub use arrow::Arrow;
pub use body::{Body, GroundProbe, NoGround};
pub use clock::{Countdown, FrameClock};
pub use contact::{Collider, Contact, ContactKind, handle_contacts};
pub use enemy::{Enemy, EnemyAnim, EnemyState};
pub use events::{AnimTrigger, DeathCause, EntityRef, GameEvent, SceneChange, Spawn};
pub use melee::MeleeHitbox;
pub use noise::NoiseSignal;
pub use player::{Player, PlayerAnim, PlayerState};
pub use state::{GameState, LevelPhase};
pub use tick::{TickInput, fixed_tick, tick};
