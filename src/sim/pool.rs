//! Entity arena with per-kind free-lists
//!
//! Every live non-player entity sits in a slot of the arena and is addressed
//! by a generational `EntityId`. Retired slots of poolable kinds go onto the
//! free-list of their kind and are handed back by `acquire`; other retired
//! slots go onto a shared vacant list and are reused by any kind.
//!
//! Invariants:
//! - a slot is either active or on exactly one free/vacant list, never both
//! - `acquire` always returns a slot reset to `Entity::blank(tag)`
//! - a released `EntityId` never resolves again (generation bump)

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityTag};

/// Stable handle to an arena slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone)]
struct Slot {
    entity: Entity,
    generation: u32,
    active: bool,
}

/// Arena of entities with one free-list per poolable kind
#[derive(Debug, Clone, Default)]
pub struct EntityPool {
    slots: Vec<Slot>,
    free: [Vec<u32>; EntityTag::COUNT],
    /// Retired slots of non-poolable kinds
    vacant: Vec<u32>,
    active_count: usize,
}

impl EntityPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take an entity of `tag`, reusing a retired one of the same kind when
    /// available. The returned entity is always freshly reset.
    pub fn acquire(&mut self, tag: EntityTag) -> EntityId {
        let recycled = if tag.is_poolable() {
            self.free[tag.index()].pop()
        } else {
            None
        };

        let index = match recycled.or_else(|| self.vacant.pop()) {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entity = Entity::blank(tag);
                slot.generation = slot.generation.wrapping_add(1);
                slot.active = true;
                if recycled.is_some() {
                    log::debug!("Recycled {:?} from pool (slot {})", tag, index);
                }
                index
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    entity: Entity::blank(tag),
                    generation: 0,
                    active: true,
                });
                index
            }
        };

        self.active_count += 1;
        EntityId {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    /// Retire an entity. Returns `false` (and does nothing) for stale or
    /// already-released handles, so double releases are harmless.
    pub fn release(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return false;
        };
        if !slot.active || slot.generation != id.generation {
            return false;
        }

        slot.active = false;
        let tag = slot.entity.tag();
        if tag.is_poolable() {
            self.free[tag.index()].push(id.index);
        } else {
            self.vacant.push(id.index);
        }
        self.active_count -= 1;
        true
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots
            .get(id.index())
            .filter(|s| s.active && s.generation == id.generation)
            .map(|s| &s.entity)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.index())
            .filter(|s| s.active && s.generation == id.generation)
            .map(|s| &mut s.entity)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Active entities in slot order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.active).map(|(i, s)| {
            (
                EntityId {
                    index: i as u32,
                    generation: s.generation,
                },
                &s.entity,
            )
        })
    }

    /// Handles of all active entities, in slot order
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Number of active entities
    pub fn len(&self) -> usize {
        self.active_count
    }

    pub fn is_empty(&self) -> bool {
        self.active_count == 0
    }

    /// Retired entities waiting for reuse on the free-list of `tag`
    pub fn free_len(&self, tag: EntityTag) -> usize {
        self.free[tag.index()].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_acquire_release_recycles_slot() {
        let mut pool = EntityPool::new();
        let a = pool.acquire(EntityTag::Enemy);
        assert_eq!(pool.len(), 1);
        assert!(pool.release(a));
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.free_len(EntityTag::Enemy), 1);

        let b = pool.acquire(EntityTag::Enemy);
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());
        assert_eq!(pool.free_len(EntityTag::Enemy), 0);
    }

    #[test]
    fn test_recycled_entity_has_no_stale_state() {
        let mut pool = EntityPool::new();
        let id = pool.acquire(EntityTag::Meteor);
        {
            let m = pool.get_mut(id).unwrap();
            m.health = -3;
            m.fading = true;
            m.marked_for_removal = true;
            m.opacity = 0.1;
            m.pos = Vec2::new(50.0, 900.0);
            m.speed = 14.0;
        }
        pool.release(id);

        let id = pool.acquire(EntityTag::Meteor);
        assert_eq!(pool.get(id).unwrap(), &Entity::blank(EntityTag::Meteor));
    }

    #[test]
    fn test_stale_handle_does_not_resolve() {
        let mut pool = EntityPool::new();
        let old = pool.acquire(EntityTag::Star);
        pool.release(old);
        let new = pool.acquire(EntityTag::Star);
        assert!(pool.get(old).is_none());
        assert!(!pool.release(old));
        assert!(pool.contains(new));
    }

    #[test]
    fn test_double_release_is_noop() {
        let mut pool = EntityPool::new();
        let id = pool.acquire(EntityTag::HealthPickup);
        assert!(pool.release(id));
        assert!(!pool.release(id));
        assert_eq!(pool.free_len(EntityTag::HealthPickup), 1);
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn test_free_lists_are_per_kind() {
        let mut pool = EntityPool::new();
        let enemy = pool.acquire(EntityTag::Enemy);
        pool.release(enemy);

        // A meteor must not take the enemy's pooled slot
        let meteor = pool.acquire(EntityTag::Meteor);
        assert_ne!(meteor.index(), enemy.index());
        assert_eq!(pool.free_len(EntityTag::Enemy), 1);
    }

    #[test]
    fn test_lasers_are_not_pooled() {
        let mut pool = EntityPool::new();
        let laser = pool.acquire(EntityTag::Laser);
        pool.release(laser);
        assert_eq!(pool.free_len(EntityTag::Laser), 0);

        // The vacant slot is reused by the next allocation of any kind
        let power_up = pool.acquire(EntityTag::PowerUpPickup);
        assert_eq!(power_up.index(), laser.index());
        assert_eq!(pool.get(power_up).unwrap().tag(), EntityTag::PowerUpPickup);
    }

    #[test]
    fn test_iter_skips_released() {
        let mut pool = EntityPool::new();
        let a = pool.acquire(EntityTag::Enemy);
        let b = pool.acquire(EntityTag::Meteor);
        let c = pool.acquire(EntityTag::Star);
        pool.release(b);
        assert_eq!(pool.ids(), vec![a, c]);
    }
}
