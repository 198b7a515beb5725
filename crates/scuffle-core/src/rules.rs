//! Collision rule configuration.
//!
//! A [`RuleBook`] holds, per [`Group`], three kinds of *factory* callables:
//!
//! - a global-eligibility factory, producing the per-tick opt-out gate for
//!   the whole group
//! - per-opposing-group hit-check factories, producing the pairwise
//!   predicates
//! - per-opposing-group reaction factories, producing the callbacks run on
//!   a confirmed hit
//!
//! A factory is a zero-argument callable that builds the predicate or
//! callback actually reused every tick. The indirection exists so expensive
//! setup (precomputed thresholds, captured lookup tables) happens once per
//! cached kind or group, not once per pairwise test: the
//! [`Dispatcher`](crate::dispatch::Dispatcher) invokes each factory at most
//! once per cache key and stores the result.
//!
//! The rule book is written during startup configuration and is read-only
//! once handed to a dispatcher. Lookups are pure; missing entries mean "this
//! pairing is not of interest", never an error.
//!
//! # Example
//!
//! ```
//! use scuffle_core::rules::{HitCheck, RuleBook};
//! use scuffle_core::entity::Group;
//!
//! let mut rules = RuleBook::new();
//! rules.register_hit_check(Group::Actor, Group::Obstacle, || {
//!     Box::new(|a, b| a.aabb().overlaps(&b.aabb()))
//! });
//!
//! assert!(rules.hit_check_factory(Group::Actor, Group::Obstacle).is_some());
//! assert!(rules.hit_check_factory(Group::Actor, Group::Zone).is_none());
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::entity::{Entity, EntityId, Group};
use crate::world::World;

// =============================================================================
// Compiled callback types
// =============================================================================

/// Per-group gate deciding whether an entity participates in collision
/// testing at all this tick (e.g. skips dead or invisible entities).
pub type GlobalCheck = Box<dyn Fn(&Entity) -> bool>;

/// Predicate deciding whether two specific entities are actually colliding
/// once identified as candidates.
pub type HitCheck = Box<dyn Fn(&Entity, &Entity) -> bool>;

/// Side-effecting callback invoked when a hit-check confirms a collision.
///
/// Receives the world plus `(subject, candidate)` ids; may mutate or despawn
/// either entity. Reactions should tolerate firing more than once per tick
/// for the same pair (see the dispatch module on shared cells).
pub type HitReaction = Box<dyn Fn(&mut World, EntityId, EntityId)>;

// =============================================================================
// Factory types
// =============================================================================

/// Factory producing a [`GlobalCheck`]; invoked at most once per group.
pub type GlobalCheckFactory = Box<dyn Fn() -> GlobalCheck>;

/// Factory producing a [`HitCheck`]; invoked at most once per
/// (kind, opposing group).
pub type HitCheckFactory = Box<dyn Fn() -> HitCheck>;

/// Factory producing a [`HitReaction`]; invoked at most once per
/// (kind, opposing group).
pub type HitReactionFactory = Box<dyn Fn() -> HitReaction>;

/// Rules registered for a single group.
#[derive(Default)]
struct GroupRules {
    /// Global-eligibility factory, if the group declared one.
    eligibility: Option<GlobalCheckFactory>,
    /// Hit-check factories keyed by opposing group.
    hit_checks: HashMap<Group, HitCheckFactory>,
    /// Reaction factories keyed by opposing group.
    reactions: HashMap<Group, HitReactionFactory>,
}

// =============================================================================
// Rule Book
// =============================================================================

/// Startup-time registry of collision rule factories.
///
/// Also carries the ordered list of groups the dispatcher checks against.
/// Ordering affects only iteration cost and reaction ordering within a tick,
/// not which rules fire.
pub struct RuleBook {
    /// Groups in dispatch check order.
    order: Vec<Group>,
    /// Per-group rule factories.
    groups: HashMap<Group, GroupRules>,
}

impl RuleBook {
    /// Creates an empty rule book checking all groups in the default order.
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: Group::ALL.to_vec(),
            groups: HashMap::new(),
        }
    }

    /// Replaces the ordered group list, builder style.
    ///
    /// Groups left out of the list are never checked during automatic
    /// dispatch, even if rules are registered for them.
    #[must_use]
    pub fn with_order(mut self, order: Vec<Group>) -> Self {
        self.order = order;
        self
    }

    /// Returns the groups in dispatch check order.
    #[must_use]
    pub fn order(&self) -> &[Group] {
        &self.order
    }

    /// Registers the global-eligibility factory for a group.
    ///
    /// Replaces any previously registered factory for the group.
    pub fn register_eligibility<F>(&mut self, group: Group, factory: F)
    where
        F: Fn() -> GlobalCheck + 'static,
    {
        self.groups.entry(group).or_default().eligibility = Some(Box::new(factory));
    }

    /// Registers the hit-check factory for a (group, opposing group) pair.
    pub fn register_hit_check<F>(&mut self, group: Group, opposing: Group, factory: F)
    where
        F: Fn() -> HitCheck + 'static,
    {
        self.groups
            .entry(group)
            .or_default()
            .hit_checks
            .insert(opposing, Box::new(factory));
    }

    /// Registers the reaction factory for a (group, opposing group) pair.
    pub fn register_reaction<F>(&mut self, group: Group, opposing: Group, factory: F)
    where
        F: Fn() -> HitReaction + 'static,
    {
        self.groups
            .entry(group)
            .or_default()
            .reactions
            .insert(opposing, Box::new(factory));
    }

    /// Returns the global-eligibility factory for a group, if registered.
    #[must_use]
    pub fn eligibility_factory(&self, group: Group) -> Option<&GlobalCheckFactory> {
        self.groups.get(&group)?.eligibility.as_ref()
    }

    /// Returns the hit-check factory for a (group, opposing group) pair,
    /// if registered.
    #[must_use]
    pub fn hit_check_factory(&self, group: Group, opposing: Group) -> Option<&HitCheckFactory> {
        self.groups.get(&group)?.hit_checks.get(&opposing)
    }

    /// Returns the reaction factory for a (group, opposing group) pair,
    /// if registered.
    #[must_use]
    pub fn reaction_factory(&self, group: Group, opposing: Group) -> Option<&HitReactionFactory> {
        self.groups.get(&group)?.reactions.get(&opposing)
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RuleBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleBook")
            .field("order", &self.order)
            .field("group_count", &self.groups.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlap_check() -> HitCheck {
        Box::new(|a, b| a.aabb().overlaps(&b.aabb()))
    }

    #[test]
    fn new_uses_default_order() {
        let rules = RuleBook::new();
        assert_eq!(rules.order(), &Group::ALL);
    }

    #[test]
    fn with_order_overrides() {
        let rules = RuleBook::new().with_order(vec![Group::Obstacle, Group::Actor]);
        assert_eq!(rules.order(), &[Group::Obstacle, Group::Actor]);
    }

    #[test]
    fn unregistered_lookups_are_none() {
        let rules = RuleBook::new();
        assert!(rules.eligibility_factory(Group::Actor).is_none());
        assert!(rules.hit_check_factory(Group::Actor, Group::Zone).is_none());
        assert!(rules.reaction_factory(Group::Actor, Group::Zone).is_none());
    }

    #[test]
    fn registered_eligibility_is_found() {
        let mut rules = RuleBook::new();
        rules.register_eligibility(Group::Actor, || Box::new(Entity::is_alive));

        assert!(rules.eligibility_factory(Group::Actor).is_some());
        assert!(rules.eligibility_factory(Group::Zone).is_none());
    }

    #[test]
    fn hit_check_is_keyed_by_pair() {
        let mut rules = RuleBook::new();
        rules.register_hit_check(Group::Actor, Group::Obstacle, overlap_check);

        assert!(rules.hit_check_factory(Group::Actor, Group::Obstacle).is_some());
        // The reverse pairing is a distinct key
        assert!(rules.hit_check_factory(Group::Obstacle, Group::Actor).is_none());
    }

    #[test]
    fn factory_produces_working_check() {
        use crate::entity::{EntityId, KindId};
        use glam::Vec2;

        let mut rules = RuleBook::new();
        rules.register_hit_check(Group::Actor, Group::Actor, overlap_check);

        let factory = rules.hit_check_factory(Group::Actor, Group::Actor).unwrap();
        let check = factory();

        let a = Entity::new(
            EntityId::new(1),
            Group::Actor,
            KindId::new("slime"),
            Vec2::ZERO,
            Vec2::new(8.0, 12.0),
        );
        let b = Entity::new(
            EntityId::new(2),
            Group::Actor,
            KindId::new("slime"),
            Vec2::new(4.0, 4.0),
            Vec2::new(8.0, 12.0),
        );

        assert!(check(&a, &b));
    }

    #[test]
    fn reaction_factory_roundtrip() {
        use glam::Vec2;
        use std::cell::Cell;
        use std::rc::Rc;

        let fired = Rc::new(Cell::new(0u32));
        let fired_in_reaction = Rc::clone(&fired);

        let mut rules = RuleBook::new();
        rules.register_reaction(Group::Actor, Group::Zone, move || {
            let fired = Rc::clone(&fired_in_reaction);
            Box::new(move |_world, _subject, _candidate| {
                fired.set(fired.get() + 1);
            })
        });

        let reaction = rules.reaction_factory(Group::Actor, Group::Zone).unwrap()();
        let mut world = World::new();
        let id = world.spawn(
            Group::Actor,
            crate::entity::KindId::new("slime"),
            Vec2::ZERO,
            Vec2::new(8.0, 12.0),
        );
        reaction(&mut world, id, id);

        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn debug_format() {
        let rules = RuleBook::new();
        let debug = format!("{:?}", rules);
        assert!(debug.contains("RuleBook"));
        assert!(debug.contains("order"));
    }
}
