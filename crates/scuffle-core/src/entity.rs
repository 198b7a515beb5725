//! Entity model for the collision runtime.
//!
//! This module provides the core identity and classification types:
//! - [`EntityId`]: Unique identifier for entities
//! - [`Group`]: Coarse collision category, the unit at which rules are registered
//! - [`KindId`]: Fine classification within a group, the unit at which dispatch
//!   closures are compiled and cached
//! - [`EntityFlags`]: Status flags read by eligibility checks
//! - [`Entity`]: The positioned, boxed object the engine tests
//!
//! # Groups vs. kinds
//!
//! Rules (eligibility, hit-checks, reactions) are keyed by [`Group`], a small
//! closed set, so an unregistered category is a compile error. Kinds are an
//! open, data-driven set (`"slime"`, `"boulder"`, ...): many kinds map to one
//! group, and the collision dispatcher compiles one specialized closure per
//! kind. The kind→group binding is fixed when the kind is first cached.
//!
//! # Example
//!
//! ```
//! use scuffle_core::entity::{Entity, EntityId, Group, KindId};
//! use glam::Vec2;
//!
//! let slime = Entity::new(
//!     EntityId::new(1),
//!     Group::Actor,
//!     KindId::new("slime"),
//!     Vec2::new(32.0, 48.0),
//!     Vec2::new(8.0, 12.0),
//! );
//!
//! assert_eq!(slime.group(), Group::Actor);
//! assert!(slime.is_alive());
//! ```

use std::fmt;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use warren::Aabb;

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64` that provides type safety and
/// a clear semantic meaning. Entity IDs are immutable once assigned and must
/// be unique within a world.
///
/// # Ordering
///
/// Entity IDs are ordered by their numeric value, which is used to ensure
/// deterministic iteration order across all entities.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Coarse collision category.
///
/// `Group` is the key under which collision rules are registered: the
/// eligibility gate is per group, and hit-checks/reactions are per
/// (group, opposing group) pair. Keeping this a closed enum means a rule
/// against an unknown category cannot be expressed at all.
///
/// # Variants
///
/// - `Actor`: Moving creatures and the player
/// - `Obstacle`: Static level geometry (rocks, fences, ledges)
/// - `Projectile`: Short-lived moving objects (thrown items, shots)
/// - `Zone`: Non-solid trigger regions (tall grass, doorways)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    /// Moving creature or player character
    Actor,
    /// Static level geometry
    Obstacle,
    /// Short-lived moving object
    Projectile,
    /// Non-solid trigger region
    Zone,
}

impl Group {
    /// Every group, in the default check order.
    pub const ALL: [Self; 4] = [Self::Actor, Self::Obstacle, Self::Projectile, Self::Zone];
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actor => write!(f, "Actor"),
            Self::Obstacle => write!(f, "Obstacle"),
            Self::Projectile => write!(f, "Projectile"),
            Self::Zone => write!(f, "Zone"),
        }
    }
}

/// Fine entity classification within a group.
///
/// Kinds are data-driven (loaded from content tables at startup), so they
/// stay an open string set rather than an enum. The dispatcher caches one
/// compiled closure per kind; see
/// [`Dispatcher::cache_kind`](crate::dispatch::Dispatcher::cache_kind).
///
/// # Example
///
/// ```
/// use scuffle_core::entity::KindId;
///
/// let kind = KindId::new("slime");
/// assert_eq!(kind.as_str(), "slime");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KindId(String);

impl KindId {
    /// Creates a new `KindId` from a string.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the kind ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for KindId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for KindId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

bitflags! {
    /// Status flags read by per-group eligibility checks.
    ///
    /// Reactions flip these to take entities out of (or put them back into)
    /// collision testing without despawning them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EntityFlags: u8 {
        /// Entity participates in the simulation at all.
        const ALIVE = 1 << 0;
        /// Entity is rendered and collidable.
        const VISIBLE = 1 << 1;
        /// Entity blocks movement.
        const SOLID = 1 << 2;
    }
}

impl Default for EntityFlags {
    fn default() -> Self {
        Self::ALIVE | Self::VISIBLE | Self::SOLID
    }
}

/// A live, positioned, boxed object in the world.
///
/// Entities are owned by the [`World`](crate::world::World). The collision
/// engine never creates, destroys, or repositions them; it only reads their
/// hitboxes and invokes reactions that may mutate them.
///
/// Positions are top-left corner, y-down screen coordinates; the hitbox is
/// `position..position + size`.
///
/// # Invariants
///
/// - The `EntityId` must be unique within a world
/// - Every entity has exactly one group and exactly one kind, and the kind
///   must belong to the group it was first cached under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    group: Group,
    kind: KindId,
    position: Vec2,
    size: Vec2,
    flags: EntityFlags,
}

impl Entity {
    /// Creates a new entity with default flags (`ALIVE | VISIBLE | SOLID`).
    #[must_use]
    pub fn new(id: EntityId, group: Group, kind: KindId, position: Vec2, size: Vec2) -> Self {
        Self {
            id,
            group,
            kind,
            position,
            size,
            flags: EntityFlags::default(),
        }
    }

    /// Replaces the entity's flags, builder style.
    #[must_use]
    pub fn with_flags(mut self, flags: EntityFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's collision group.
    #[must_use]
    pub const fn group(&self) -> Group {
        self.group
    }

    /// Returns the entity's kind.
    #[must_use]
    pub fn kind(&self) -> &KindId {
        &self.kind
    }

    /// Returns the entity's top-left position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the entity to a new top-left position.
    ///
    /// The spatial partition is not updated until the next refresh.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Returns the entity's hitbox size.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Returns the entity's current hitbox.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_pos_size(self.position, self.size)
    }

    /// Returns the entity's status flags.
    #[must_use]
    pub const fn flags(&self) -> EntityFlags {
        self.flags
    }

    /// Returns a mutable reference to the entity's status flags.
    pub fn flags_mut(&mut self) -> &mut EntityFlags {
        &mut self.flags
    }

    /// Returns `true` if the `ALIVE` flag is set.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.flags.contains(EntityFlags::ALIVE)
    }
}
