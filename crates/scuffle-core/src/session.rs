//! Tick loop tying world, spatial partition, and dispatcher together.
//!
//! A [`Session`] owns the three moving parts of the engine and enforces their
//! ordering contract per tick:
//!
//! 1. refresh the spatial partition from current entity positions
//! 2. dispatch collision for every live entity, in id order
//!
//! Spawning through the session also caches the entity's kind in the
//! dispatcher, so the first entity of a kind pays the one-time compilation
//! cost and later spawns of that kind are cache hits. Movement between ticks
//! leaves the partition stale on purpose; [`Session::step`] rebuilds it
//! before any dispatch closure runs.

use glam::Vec2;
use tracing::debug;

use crate::dispatch::{DispatchError, Dispatcher};
use crate::entity::{Entity, EntityFlags, EntityId, Group, KindId};
use crate::rules::RuleBook;
use crate::world::World;
use crate::CollisionGrid;

/// Owns the world, the cell grid, and the dispatcher, and runs ticks.
///
/// # Example
///
/// ```
/// use scuffle_core::session::Session;
/// use scuffle_core::rules::RuleBook;
/// use scuffle_core::entity::{Group, KindId};
/// use glam::Vec2;
///
/// let mut rules = RuleBook::new();
/// rules.register_hit_check(Group::Actor, Group::Actor, || {
///     Box::new(|a, b| a.aabb().overlaps(&b.aabb()))
/// });
///
/// let mut session = Session::new(rules, 32.0);
/// session.spawn(Group::Actor, KindId::new("slime"), Vec2::ZERO, Vec2::new(8.0, 12.0));
/// session.step().unwrap();
/// assert_eq!(session.tick(), 1);
/// ```
#[derive(Debug)]
pub struct Session {
    /// Live entity storage.
    world: World,
    /// Broad-phase partition, rebuilt at the start of every tick.
    grid: CollisionGrid,
    /// Compiled collision rules.
    dispatcher: Dispatcher,
    /// Completed tick count.
    tick: u64,
}

impl Session {
    /// Creates a session over a finished rule book.
    ///
    /// `cell_size` is the partition cell side length in world units; it
    /// should be on the order of a typical entity's size.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not strictly positive.
    #[must_use]
    pub fn new(rules: RuleBook, cell_size: f32) -> Self {
        Self {
            world: World::new(),
            grid: CollisionGrid::new(cell_size),
            dispatcher: Dispatcher::new(rules),
            tick: 0,
        }
    }

    /// Spawns an entity with default flags, caching its kind on first sight.
    pub fn spawn(&mut self, group: Group, kind: KindId, position: Vec2, size: Vec2) -> EntityId {
        self.spawn_flagged(group, kind, position, size, EntityFlags::default())
    }

    /// Spawns an entity with explicit flags, caching its kind on first sight.
    pub fn spawn_flagged(
        &mut self,
        group: Group,
        kind: KindId,
        position: Vec2,
        size: Vec2,
        flags: EntityFlags,
    ) -> EntityId {
        self.dispatcher.cache_kind(&kind, group);
        self.world.spawn_flagged(group, kind, position, size, flags)
    }

    /// Removes an entity from the world and the partition immediately.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.grid.remove(id);
        self.world.despawn(id)
    }

    /// Rebuilds the partition from current entity positions and boxes.
    ///
    /// Entities are inserted in id order, which fixes candidate ordering
    /// within each cell for the rest of the tick.
    pub fn refresh_partition(&mut self) {
        self.grid.clear();
        for entity in self.world.entities() {
            self.grid.insert(entity.id(), entity.group(), entity.aabb());
        }
    }

    /// Runs one tick: partition refresh, then dispatch per live entity.
    ///
    /// The id list is snapshotted before dispatch starts; entities despawned
    /// by an earlier reaction in the same tick are skipped, and entities
    /// spawned by a reaction are not dispatched until the next tick.
    ///
    /// # Errors
    ///
    /// [`DispatchError::UncachedKind`] if a live entity's kind was never
    /// cached. Cannot happen for entities spawned through the session; only
    /// direct [`World`] manipulation can get a world into that state.
    pub fn step(&mut self) -> Result<(), DispatchError> {
        self.refresh_partition();

        for id in self.world.ids() {
            let Some(entity) = self.world.get(id) else {
                continue;
            };
            let kind = entity.kind().clone();
            let runner = self.dispatcher.runner(&kind)?;
            runner(&mut self.world, &self.grid, id);
        }

        self.tick += 1;
        debug!(tick = self.tick, entities = self.world.len(), "tick complete");
        Ok(())
    }

    /// Returns the number of completed ticks.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Returns the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns the world mutably.
    ///
    /// Mutations leave the partition stale until the next
    /// [`step`](Self::step) or [`refresh_partition`](Self::refresh_partition).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Returns the spatial partition.
    #[must_use]
    pub fn grid(&self) -> &CollisionGrid {
        &self.grid
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}
