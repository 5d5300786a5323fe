//! Collision detection and response
//!
//! One sweep per frame over every active non-player entity:
//! 1. advance positions and retire anything that left the viewport
//! 2. obstacles vs. player, then obstacles vs. lasers
//! 3. pickups vs. player
//! 4. flush the removal set back into the pool
//!
//! Nothing is removed from the pool while the sweep runs. Removals are
//! collected into a `RemovalSet` and flushed in one pass at the end.

use std::collections::BTreeSet;

use super::entity::{EntityKind, EntityTag};
use super::geometry::intersects;
use super::pool::EntityId;
use super::state::{GameEvent, GameState, SoundCue};
use crate::consts::*;

/// Entities marked for removal this frame (ordered, duplicate-safe)
#[derive(Debug, Clone, Default)]
pub struct RemovalSet {
    ids: BTreeSet<EntityId>,
}

impl RemovalSet {
    /// Returns true the first time an id is marked
    pub fn mark(&mut self, id: EntityId) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.ids.iter().copied()
    }
}

/// Run the whole collision sweep for one frame
pub fn resolve_collisions(state: &mut GameState, events: &mut Vec<GameEvent>) -> RemovalSet {
    let mut removals = RemovalSet::default();
    let ids = state.pool.ids();

    advance_all(state, &ids, &mut removals);

    let lasers: Vec<EntityId> = ids
        .iter()
        .copied()
        .filter(|id| state.pool.get(*id).is_some_and(|e| e.tag() == EntityTag::Laser))
        .collect();

    for &id in &ids {
        let Some(tag) = state.pool.get(id).map(|e| e.tag()) else {
            continue;
        };
        if removals.contains(id) {
            continue;
        }
        if tag.is_obstacle() {
            resolve_obstacle(state, id, &lasers, &mut removals, events);
        } else if tag.is_pickup() {
            resolve_pickup(state, id, &mut removals, events);
        }
    }

    flush_removals(state, &removals, events);
    removals
}

fn mark(state: &mut GameState, id: EntityId, removals: &mut RemovalSet) {
    if let Some(entity) = state.pool.get_mut(id) {
        entity.marked_for_removal = true;
    }
    removals.mark(id);
}

/// Move everything and retire what left the playfield
fn advance_all(state: &mut GameState, ids: &[EntityId], removals: &mut RemovalSet) {
    let viewport = state.viewport;
    for &id in ids {
        let Some(entity) = state.pool.get_mut(id) else {
            continue;
        };
        entity.advance();

        let gone = match entity.tag() {
            EntityTag::Laser => entity.rect().bottom() < 0.0,
            EntityTag::Player => false,
            _ => entity.is_outside(viewport.width, viewport.height),
        };
        if gone {
            entity.marked_for_removal = true;
            removals.mark(id);
        }
    }
}

/// Obstacle vs. player, then obstacle vs. every live laser
fn resolve_obstacle(
    state: &mut GameState,
    id: EntityId,
    lasers: &[EntityId],
    removals: &mut RemovalSet,
    events: &mut Vec<GameEvent>,
) {
    let Some(obstacle_rect) = state.pool.get(id).map(|e| e.rect()) else {
        return;
    };

    // Rammed the player: the obstacle is spent and can't be shot this frame
    if intersects(&state.player.rect(), &obstacle_rect) {
        mark(state, id, removals);
        state.player.lose_health();
        state.flash_damage();
        state.stats.hits_taken += 1;
        events.push(GameEvent::PlayerDamaged {
            health: state.player.health,
        });
        events.push(GameEvent::Sound(SoundCue::PlayerDamaged));
        return;
    }

    for &laser_id in lasers {
        if removals.contains(laser_id) {
            continue;
        }
        let Some((laser_rect, powered_up)) = state.pool.get(laser_id).map(|l| {
            let powered_up = matches!(l.kind, EntityKind::Laser { powered_up: true });
            (l.rect(), powered_up)
        }) else {
            continue;
        };
        // Recoil moves the obstacle, so re-read its rect for every laser
        let Some(obstacle_rect) = state.pool.get(id).map(|e| e.rect()) else {
            return;
        };
        if !intersects(&laser_rect, &obstacle_rect) {
            continue;
        }

        mark(state, laser_id, removals);
        events.push(GameEvent::Sound(SoundCue::LaserImpact));

        let Some(obstacle) = state.pool.get_mut(id) else {
            return;
        };
        obstacle.take_laser_hit(powered_up);
        obstacle.recoil();

        if obstacle.is_dead() && !obstacle.marked_for_removal {
            obstacle.marked_for_removal = true;
            obstacle.fading = true;
            let tag = obstacle.tag();
            removals.mark(id);
            award_kill(state, tag, events);
        }
    }
}

fn award_kill(state: &mut GameState, tag: EntityTag, events: &mut Vec<GameEvent>) {
    match tag {
        EntityTag::Enemy => {
            state.score += ENEMY_KILL_SCORE;
            state.stats.enemies_destroyed += 1;
            events.push(GameEvent::Sound(SoundCue::EnemyDestroyed));
        }
        EntityTag::Meteor => {
            state.score += METEOR_KILL_SCORE;
            state.stats.meteors_destroyed += 1;
            events.push(GameEvent::Sound(SoundCue::MeteorDestroyed));
        }
        _ => {}
    }
}

/// Pickups only interact with the player
fn resolve_pickup(
    state: &mut GameState,
    id: EntityId,
    removals: &mut RemovalSet,
    events: &mut Vec<GameEvent>,
) {
    let Some((rect, kind)) = state.pool.get(id).map(|e| (e.rect(), e.kind)) else {
        return;
    };
    if !intersects(&state.player.rect(), &rect) {
        return;
    }

    mark(state, id, removals);
    match kind {
        EntityKind::HealthPickup { heal } => {
            state.player.gain_health(heal);
            state.stats.health_collected += 1;
            events.push(GameEvent::PlayerHealed {
                health: state.player.health,
            });
            events.push(GameEvent::Sound(SoundCue::PlayerHealed));
        }
        EntityKind::PowerUpPickup => {
            state.stats.power_ups_collected += 1;
            state.apply_power_up(events);
        }
        _ => {}
    }
}

/// Return every marked entity to the pool and tell the host to hide it
pub fn flush_removals(state: &mut GameState, removals: &RemovalSet, events: &mut Vec<GameEvent>) {
    for id in removals.iter() {
        let fade = state.pool.get(id).is_some_and(|e| e.fading);
        if state.pool.release(id) {
            events.push(GameEvent::Despawned { id, fade });
        }
    }
}
