//! # Scuffle Core
//!
//! Collision-dispatch engine for a real-time 2D arena game.
//!
//! The engine decides, every tick, which entity pairs collide and what
//! happens when they do. Rules are registered once at startup as zero-arg
//! factories; the dispatcher compiles them lazily into per-kind closures the
//! first time each kind appears, so per-tick work is cache lookups and
//! pairwise tests only.
//!
//! ## Architecture
//!
//! - [`entity`]: ids, groups, kinds, flags, and the entity record itself
//! - [`world`]: id-ordered entity storage, the mutable surface reactions see
//! - [`rules`]: the startup-time [`RuleBook`](rules::RuleBook) of factories
//! - [`dispatch`]: lazy compilation, caching, and the per-kind dispatch walk
//! - [`session`]: the tick loop tying world, partition, and dispatcher
//!   together
//!
//! Broad-phase candidate lookup comes from the [`warren`] cell grid,
//! re-exported here and aliased as [`CollisionGrid`].
//!
//! ## Usage
//!
//! ```
//! use scuffle_core::entity::{Group, KindId};
//! use scuffle_core::rules::RuleBook;
//! use scuffle_core::session::Session;
//! use glam::Vec2;
//!
//! let mut rules = RuleBook::new();
//! rules.register_hit_check(Group::Actor, Group::Actor, || {
//!     Box::new(|a, b| a.aabb().overlaps(&b.aabb()))
//! });
//! rules.register_reaction(Group::Actor, Group::Actor, || {
//!     Box::new(|world, _subject, candidate| {
//!         world.despawn(candidate);
//!     })
//! });
//!
//! let mut session = Session::new(rules, 32.0);
//! session.spawn(Group::Actor, KindId::new("slime"), Vec2::ZERO, Vec2::new(8.0, 12.0));
//! session.spawn(Group::Actor, KindId::new("slime"), Vec2::new(4.0, 4.0), Vec2::new(8.0, 12.0));
//! session.step().unwrap();
//! assert_eq!(session.world().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export warren for spatial queries
pub use warren;

pub mod dispatch;
pub mod entity;
pub mod rules;
pub mod session;
pub mod world;

pub use dispatch::{DispatchError, Dispatcher};
pub use entity::{Entity, EntityFlags, EntityId, Group, KindId};
pub use rules::RuleBook;
pub use session::Session;
pub use world::World;

/// Broad-phase partition specialized to this engine: entity ids bucketed by
/// collision group.
pub type CollisionGrid = warren::CellGrid<EntityId, Group>;

#[cfg(test)]
mod tests;
