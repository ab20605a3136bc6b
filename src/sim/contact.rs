//! Contact routing
//!
//! The physics collaborator reports collision and trigger contacts; this
//! module turns them into state transitions. Either side of a pair may be
//! reported as the subject.

use super::events::DeathCause;
use super::state::GameState;

/// One side of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collider {
    Ground,
    Ceiling,
    /// Kill zone (pits, spikes, retry triggers)
    Hazard,
    Player,
    Enemy(u32),
    Arrow(u32),
    Ladder(u32),
    Noise(u32),
    Melee(u32),
}

impl Collider {
    /// Lower rank is routed as the subject
    fn rank(self) -> u8 {
        match self {
            Collider::Player => 0,
            Collider::Arrow(_) => 1,
            Collider::Melee(_) => 2,
            Collider::Enemy(_) => 3,
            _ => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactKind {
    CollisionBegin,
    TriggerEnter,
    TriggerExit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Contact {
    pub subject: Collider,
    pub other: Collider,
    pub kind: ContactKind,
}

impl Contact {
    pub fn begin(subject: Collider, other: Collider) -> Self {
        Self {
            subject,
            other,
            kind: ContactKind::CollisionBegin,
        }
    }

    pub fn enter(subject: Collider, other: Collider) -> Self {
        Self {
            subject,
            other,
            kind: ContactKind::TriggerEnter,
        }
    }

    pub fn exit(subject: Collider, other: Collider) -> Self {
        Self {
            subject,
            other,
            kind: ContactKind::TriggerExit,
        }
    }

    fn oriented(self) -> Self {
        if self.other.rank() < self.subject.rank() {
            Self {
                subject: self.other,
                other: self.subject,
                kind: self.kind,
            }
        } else {
            self
        }
    }
}

/// Apply a batch of contacts in order
pub fn handle_contacts(state: &mut GameState, contacts: &[Contact]) {
    for contact in contacts {
        handle_contact(state, *contact);
    }
}

fn handle_contact(state: &mut GameState, contact: Contact) {
    use Collider::*;
    use ContactKind::*;

    if !state.is_playing() {
        return;
    }

    let Contact {
        subject,
        other,
        kind,
    } = contact.oriented();

    match (subject, other, kind) {
        (Player, Ground, CollisionBegin) => {
            if let Some(landing) = state.player.touch_ground(&state.settings.player) {
                log::debug!("Player landed ({landing:?})");
                state.apply_landing(landing);
            }
        }
        (Player, Ceiling, CollisionBegin) => state.player.touch_ceiling(),
        (Player, Hazard, CollisionBegin | TriggerEnter) => state.kill_player(DeathCause::Hazard),
        (Player, Enemy(id), CollisionBegin | TriggerEnter) => {
            match state.enemy(id).map(|e| !e.is_dead()) {
                Some(true) => state.kill_player(DeathCause::EnemyContact),
                Some(false) => {}
                None => log::warn!("Contact with unknown archer {id}"),
            }
        }
        (Player, Ladder(id), TriggerEnter) => {
            if state.ladder(id).is_some() {
                state.player.enter_ladder_zone(id);
            } else {
                log::warn!("Contact with unknown ladder {id}");
            }
        }
        (Player, Ladder(id), TriggerExit) => {
            state.player.exit_ladder_zone(id, &state.settings.player);
        }
        (Player, Arrow(id), CollisionBegin | TriggerEnter) => {
            let policy = state.settings.arrow_player_contact;
            let Some(hit) = state
                .arrows
                .iter()
                .find(|a| a.id == id)
                .map(|a| a.touch_player(policy))
            else {
                log::warn!("Contact with unknown arrow {id}");
                return;
            };
            if hit.lethal {
                state.kill_player(DeathCause::Arrow);
            }
            if hit.destroy_arrow {
                state.remove_arrow(id);
            }
        }
        (Arrow(id), Ground | Ceiling, CollisionBegin) => {
            match state.arrows.iter_mut().find(|a| a.id == id) {
                Some(arrow) => arrow.land(),
                None => log::warn!("Contact with unknown arrow {id}"),
            }
        }
        (Melee(hitbox), Enemy(id), CollisionBegin | TriggerEnter) => {
            if state.melee.iter().any(|m| m.id == hitbox) {
                state.kill_enemy(id);
            } else {
                log::warn!("Contact with unknown hitbox {hitbox}");
            }
        }
        (Enemy(id), Noise(noise), TriggerEnter) => {
            let Some(noise_pos) = state.noises.iter().find(|n| n.id == noise).map(|n| n.pos)
            else {
                log::warn!("Contact with unknown noise {noise}");
                return;
            };
            let player_y = state.player.body.pos.y;
            match state.enemy_mut(id) {
                Some(enemy) => {
                    enemy.hear_noise(noise_pos, player_y);
                }
                None => log::warn!("Contact with unknown archer {id}"),
            }
        }
        _ => log::trace!("Ignored contact {contact:?}"),
    }
}
