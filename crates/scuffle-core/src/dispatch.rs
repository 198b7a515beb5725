//! Collision dispatcher: lazy compilation and caching of per-kind checks.
//!
//! The [`Dispatcher`] turns the factory callables in a [`RuleBook`] into
//! compiled predicates exactly once per cache key, then drives per-tick
//! pairwise testing through a specialized closure per entity kind:
//!
//! - [`Dispatcher::cache_group`] compiles a group's global-eligibility gate
//! - [`Dispatcher::cache_kind`] compiles a kind's hit-check and reaction
//!   tables plus its dispatch closure (typically at first spawn of the kind)
//! - [`Dispatcher::runner`] returns the cached closure the tick loop invokes
//!   for every live entity of that kind
//! - [`Dispatcher::check_hit`] is the manual single-pair path for tests and
//!   diagnostics, bypassing the spatial partition
//!
//! # Caching model
//!
//! Caches are populated incrementally as kinds are first encountered and are
//! never invalidated; rule sets are static per session. Each factory is
//! invoked at most once per (group) or (kind, opposing group), guarded by
//! cache-presence checks rather than locks: the engine is single-threaded by
//! design, which is why the shared state below is `Rc`/`RefCell`, not
//! `Arc`/`Mutex`. Multiple independent dispatchers (one per world) can
//! coexist; nothing here is process-global.
//!
//! # Dispatch walk
//!
//! The compiled closure walks the subject's occupied cells and, per cell,
//! the candidate list of every group in the configured order that has a
//! compiled hit-check. Within one cell's list the walk stops at the subject
//! itself: an entity only tests same-group candidates registered ahead of
//! it, which both prevents self-collision and keeps a same-group pair from
//! reacting twice from a single shared cell. A pair sharing *several* cells
//! may react once per shared cell; reactions are expected to tolerate that.
//!
//! # Failure semantics
//!
//! Missing rules during automatic dispatch are silent skips (the pairing is
//! simply not of interest). The manual [`check_hit`](Dispatcher::check_hit)
//! path and [`runner`](Dispatcher::runner) lookups fail hard instead, since
//! their callers explicitly expect the configuration to exist.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::entity::{Entity, EntityId, Group, KindId};
use crate::rules::{GlobalCheck, RuleBook};
use crate::world::World;
use crate::CollisionGrid;

/// Compiled per-kind dispatch closure.
///
/// Invoked once per live entity of the kind per tick, strictly after the
/// spatial partition has been refreshed. Takes the world mutably so
/// reactions can mutate or despawn entities mid-walk.
pub type DispatchFn = Box<dyn Fn(&mut World, &CollisionGrid, EntityId)>;

/// Errors from the explicit dispatcher lookup paths.
///
/// Both variants indicate configuration bugs at the integration layer; the
/// engine does not retry or self-heal.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Manual pair test requested for a pairing with no registered hit-check.
    #[error("no hit-check registered for kind `{kind}` against group {group}")]
    MissingRule {
        /// Kind of the subject entity.
        kind: KindId,
        /// Group of the opposing entity.
        group: Group,
    },
    /// Dispatch requested for a kind that was never cached.
    #[error("kind `{0}` was never cached; call cache_kind before dispatching it")]
    UncachedKind(KindId),
}

/// Everything compiled for one kind: the eligibility gate shared with the
/// kind's group, plus the hit-check and reaction tables keyed by opposing
/// group. Built once by `cache_kind`, shared with the dispatch closure.
struct CompiledKind {
    /// The group this kind was first cached under.
    group: Group,
    /// Global-eligibility gate, shared with the group-keyed cache.
    eligibility: Option<Rc<GlobalCheck>>,
    /// Compiled hit-checks keyed by opposing group.
    hit_checks: HashMap<Group, crate::rules::HitCheck>,
    /// Compiled reactions keyed by opposing group.
    reactions: HashMap<Group, crate::rules::HitReaction>,
}

/// Compiles and caches collision checks per kind, and drives dispatch.
///
/// All cache structures are private mutable state owned by one dispatcher
/// instance. See the module docs for the caching and failure model.
///
/// # Example
///
/// ```
/// use scuffle_core::dispatch::Dispatcher;
/// use scuffle_core::rules::RuleBook;
/// use scuffle_core::entity::{Group, KindId};
///
/// let mut rules = RuleBook::new();
/// rules.register_hit_check(Group::Actor, Group::Actor, || {
///     Box::new(|a, b| a.aabb().overlaps(&b.aabb()))
/// });
///
/// let mut dispatcher = Dispatcher::new(rules);
/// let slime = KindId::new("slime");
/// dispatcher.cache_kind(&slime, Group::Actor);
///
/// assert!(dispatcher.is_kind_cached(&slime));
/// assert!(dispatcher.runner(&slime).is_ok());
/// ```
pub struct Dispatcher {
    /// Static rule configuration; read-only after construction.
    rules: RuleBook,
    /// Groups in dispatch check order, shared with every compiled closure.
    order: Rc<[Group]>,
    /// Group-keyed global checks. Shared mutably with the compiled closures
    /// so groups cached after a closure was built are still visible to it.
    group_checks: Rc<RefCell<HashMap<Group, Rc<GlobalCheck>>>>,
    /// Compiled tables per kind. Key presence doubles as the "already
    /// cached" guard for `cache_kind` idempotency.
    kinds: HashMap<KindId, Rc<CompiledKind>>,
    /// Compiled dispatch closures per kind.
    runners: HashMap<KindId, DispatchFn>,
}

impl Dispatcher {
    /// Creates a dispatcher over a finished rule book.
    #[must_use]
    pub fn new(rules: RuleBook) -> Self {
        let order: Rc<[Group]> = Rc::from(rules.order());
        Self {
            rules,
            order,
            group_checks: Rc::new(RefCell::new(HashMap::new())),
            kinds: HashMap::new(),
            runners: HashMap::new(),
        }
    }

    /// Compiles and caches a group's global-eligibility gate.
    ///
    /// Idempotent: the factory is invoked at most once per group. Groups
    /// without a registered factory are a silent no-op; their entities are
    /// always eligible.
    pub fn cache_group(&mut self, group: Group) {
        if self.group_checks.borrow().contains_key(&group) {
            return;
        }
        if let Some(factory) = self.rules.eligibility_factory(group) {
            debug!(%group, "compiling global-eligibility check");
            self.group_checks
                .borrow_mut()
                .insert(group, Rc::new(factory()));
        }
    }

    /// Compiles and caches everything for a kind: the group's global check,
    /// the hit-check and reaction tables, and the dispatch closure.
    ///
    /// Idempotent, guarded by the cached-kind map: repeat calls, including
    /// calls naming a different group, are no-ops (the first binding wins).
    /// Each registered factory for (kind's group, opposing group) is invoked
    /// exactly once, for every opposing group in the configured order.
    pub fn cache_kind(&mut self, kind: &KindId, group: Group) {
        if self.kinds.contains_key(kind) {
            return;
        }

        self.cache_group(group);
        let eligibility = self.group_checks.borrow().get(&group).cloned();

        let mut hit_checks = HashMap::new();
        let mut reactions = HashMap::new();
        for &opposing in self.order.iter() {
            if let Some(factory) = self.rules.hit_check_factory(group, opposing) {
                hit_checks.insert(opposing, factory());
            }
            if let Some(factory) = self.rules.reaction_factory(group, opposing) {
                reactions.insert(opposing, factory());
            }
        }

        debug!(
            %kind,
            %group,
            hit_checks = hit_checks.len(),
            reactions = reactions.len(),
            "compiled dispatch closure"
        );

        let compiled = Rc::new(CompiledKind {
            group,
            eligibility,
            hit_checks,
            reactions,
        });
        let runner = Self::compile_runner(
            Rc::clone(&compiled),
            Rc::clone(&self.order),
            Rc::clone(&self.group_checks),
        );
        self.kinds.insert(kind.clone(), compiled);
        self.runners.insert(kind.clone(), runner);
    }

    /// Returns the cached dispatch closure for a kind.
    ///
    /// # Errors
    ///
    /// [`DispatchError::UncachedKind`] if `cache_kind` was never called for
    /// this kind. Callers treat this as a fatal integration error: rule
    /// configuration is assumed complete before entities of a kind spawn.
    pub fn runner(&self, kind: &KindId) -> Result<&DispatchFn, DispatchError> {
        self.runners
            .get(kind)
            .ok_or_else(|| DispatchError::UncachedKind(kind.clone()))
    }

    /// Manual single-pair test, bypassing the spatial partition.
    ///
    /// Uses the kind's compiled hit-check when the kind is cached; for a
    /// never-cached kind the factory is resolved through `a`'s group and
    /// invoked transiently (this is a diagnostic path, cost is irrelevant).
    ///
    /// # Errors
    ///
    /// [`DispatchError::MissingRule`] when no hit-check exists for the
    /// pairing. Unlike automatic dispatch, the caller here explicitly
    /// expects the rule to be configured.
    pub fn check_hit(
        &self,
        a: &Entity,
        b: &Entity,
        kind: &KindId,
        group: Group,
    ) -> Result<bool, DispatchError> {
        if let Some(compiled) = self.kinds.get(kind) {
            return compiled.hit_checks.get(&group).map_or(
                Err(DispatchError::MissingRule {
                    kind: kind.clone(),
                    group,
                }),
                |check| Ok(check(a, b)),
            );
        }
        match self.rules.hit_check_factory(a.group(), group) {
            Some(factory) => Ok(factory()(a, b)),
            None => Err(DispatchError::MissingRule {
                kind: kind.clone(),
                group,
            }),
        }
    }

    /// Returns `true` if `cache_kind` has run for this kind.
    #[must_use]
    pub fn is_kind_cached(&self, kind: &KindId) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Returns the group a cached kind was bound to, if any.
    #[must_use]
    pub fn kind_group(&self, kind: &KindId) -> Option<Group> {
        self.kinds.get(kind).map(|compiled| compiled.group)
    }

    /// Returns the number of cached kinds.
    #[must_use]
    pub fn cached_kind_count(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if a compiled global check exists for this group.
    #[must_use]
    pub fn has_group_check(&self, group: Group) -> bool {
        self.group_checks.borrow().contains_key(&group)
    }

    /// Builds the per-kind dispatch closure.
    ///
    /// The closure owns `Rc`s of the kind's compiled tables, the shared
    /// group-check cache, and the group order, so it stays valid for the
    /// dispatcher's lifetime and sees groups cached after it was built.
    fn compile_runner(
        compiled: Rc<CompiledKind>,
        order: Rc<[Group]>,
        group_checks: Rc<RefCell<HashMap<Group, Rc<GlobalCheck>>>>,
    ) -> DispatchFn {
        Box::new(move |world: &mut World, grid: &CollisionGrid, subject: EntityId| {
            // Eligibility gate, evaluated once at entry.
            {
                let Some(entity) = world.get(subject) else {
                    return;
                };
                if let Some(gate) = &compiled.eligibility {
                    if !gate(entity) {
                        trace!(%subject, "subject opted out of collision this tick");
                        return;
                    }
                }
            }

            for cell in grid.cells_of(subject) {
                for &opposing in order.iter() {
                    let Some(check) = compiled.hit_checks.get(&opposing) else {
                        continue;
                    };
                    for &candidate in grid.candidates(*cell, opposing) {
                        if candidate == subject {
                            // Only candidates registered ahead of the subject
                            // are tested from this cell's list.
                            break;
                        }
                        let candidate_gate = group_checks.borrow().get(&opposing).cloned();
                        let hit = {
                            let Some(subject_entity) = world.get(subject) else {
                                // A reaction despawned the subject; end the walk.
                                return;
                            };
                            let Some(candidate_entity) = world.get(candidate) else {
                                continue;
                            };
                            if let Some(gate) = &candidate_gate {
                                if !gate(candidate_entity) {
                                    continue;
                                }
                            }
                            check(subject_entity, candidate_entity)
                        };
                        if hit {
                            trace!(%subject, %candidate, group = %opposing, "hit confirmed");
                            if let Some(reaction) = compiled.reactions.get(&opposing) {
                                reaction(world, subject, candidate);
                            }
                        }
                    }
                }
            }
        })
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("order", &self.order)
            .field("cached_groups", &self.group_checks.borrow().len())
            .field("cached_kinds", &self.kinds.len())
            .finish()
    }
}
