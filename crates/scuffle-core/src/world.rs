//! World storage for live entities.
//!
//! The `World` owns every live [`Entity`] and hands out ids on spawn. It is
//! the only mutable surface hit-reactions receive: a reaction looks entities
//! up by id and may move them, flip their flags, or despawn them.
//!
//! # Determinism
//!
//! Entities are stored in a `BTreeMap` so iteration is always in id order.
//! The tick loop walks ids in that order, which keeps reaction ordering
//! stable across runs.
//!
//! # Spatial partition synchronization
//!
//! The world does not own the cell grid. Mutating an entity (position or
//! flags) leaves the partition stale until the owning loop refreshes it at
//! the start of the next tick; see [`Session::step`](crate::session::Session::step).

use std::collections::BTreeMap;

use glam::Vec2;
use tracing::debug;

use crate::entity::{Entity, EntityFlags, EntityId, Group, KindId};

/// Container for all live entities, with deterministic iteration order.
///
/// # Example
///
/// ```
/// use scuffle_core::world::World;
/// use scuffle_core::entity::{Group, KindId};
/// use glam::Vec2;
///
/// let mut world = World::new();
/// let id = world.spawn(Group::Actor, KindId::new("slime"), Vec2::ZERO, Vec2::new(8.0, 12.0));
///
/// assert!(world.get(id).is_some());
/// assert_eq!(world.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct World {
    /// Entities stored in id order.
    entities: BTreeMap<EntityId, Entity>,
    /// Next id to hand out.
    next_id: u64,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Spawns an entity with default flags and returns its id.
    pub fn spawn(&mut self, group: Group, kind: KindId, position: Vec2, size: Vec2) -> EntityId {
        self.spawn_flagged(group, kind, position, size, EntityFlags::default())
    }

    /// Spawns an entity with explicit flags and returns its id.
    pub fn spawn_flagged(
        &mut self,
        group: Group,
        kind: KindId,
        position: Vec2,
        size: Vec2,
        flags: EntityFlags,
    ) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        debug!(%id, %group, kind = %kind, "spawning entity");
        let entity = Entity::new(id, group, kind, position, size).with_flags(flags);
        self.entities.insert(id, entity);
        id
    }

    /// Removes an entity, returning it if it was present.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.entities.remove(&id);
        if removed.is_some() {
            debug!(%id, "despawned entity");
        }
        removed
    }

    /// Returns a reference to an entity, if it exists.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity, if it exists.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns `true` if an entity with this id is live.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entities are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Snapshot of all live ids, in order.
    ///
    /// Used by the tick loop so dispatch can mutate the world while walking
    /// a stable id list.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_slime(world: &mut World) -> EntityId {
        world.spawn(
            Group::Actor,
            KindId::new("slime"),
            Vec2::ZERO,
            Vec2::new(8.0, 12.0),
        )
    }

    #[test]
    fn spawn_assigns_sequential_ids() {
        let mut world = World::new();
        let a = spawn_slime(&mut world);
        let b = spawn_slime(&mut world);

        assert_eq!(a, EntityId::new(0));
        assert_eq!(b, EntityId::new(1));
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn get_and_get_mut() {
        let mut world = World::new();
        let id = spawn_slime(&mut world);

        assert_eq!(world.get(id).unwrap().kind().as_str(), "slime");

        world.get_mut(id).unwrap().set_position(Vec2::new(5.0, 5.0));
        assert_eq!(world.get(id).unwrap().position(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn despawn_removes_entity_without_reusing_id() {
        let mut world = World::new();
        let a = spawn_slime(&mut world);
        world.despawn(a);

        assert!(!world.contains(a));
        assert!(world.despawn(a).is_none());

        let b = spawn_slime(&mut world);
        assert_ne!(a, b);
    }

    #[test]
    fn ids_are_sorted() {
        let mut world = World::new();
        let a = spawn_slime(&mut world);
        let b = spawn_slime(&mut world);
        let c = spawn_slime(&mut world);
        world.despawn(b);

        assert_eq!(world.ids(), vec![a, c]);
    }

    #[test]
    fn entities_iterate_in_id_order() {
        let mut world = World::new();
        spawn_slime(&mut world);
        spawn_slime(&mut world);

        let ids: Vec<_> = world.entities().map(Entity::id).collect();
        assert_eq!(ids, vec![EntityId::new(0), EntityId::new(1)]);
    }

    #[test]
    fn spawn_flagged_applies_flags() {
        let mut world = World::new();
        let id = world.spawn_flagged(
            Group::Zone,
            KindId::new("tall-grass"),
            Vec2::ZERO,
            Vec2::new(16.0, 16.0),
            EntityFlags::ALIVE | EntityFlags::VISIBLE,
        );

        let entity = world.get(id).unwrap();
        assert!(!entity.flags().contains(EntityFlags::SOLID));
    }
}
