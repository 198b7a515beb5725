//! Test setup utilities: rule-book builders and a shared reaction log.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::entity::{EntityId, Group, KindId};
use crate::rules::{HitReaction, RuleBook};
use crate::session::Session;

// =============================================================================
// Reaction logging
// =============================================================================

/// Shared log of `(subject, candidate)` pairs in reaction-firing order.
pub type ReactionLog = Rc<RefCell<Vec<(EntityId, EntityId)>>>;

/// Creates an empty reaction log.
pub fn new_log() -> ReactionLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Builds a reaction factory that appends every firing to `log`.
pub fn logging_reaction(log: &ReactionLog) -> impl Fn() -> HitReaction + 'static {
    let log = Rc::clone(log);
    move || {
        let log = Rc::clone(&log);
        Box::new(move |_world, subject, candidate| {
            log.borrow_mut().push((subject, candidate));
        })
    }
}

// =============================================================================
// Rule-book builders
// =============================================================================

/// Rule book with a box-overlap hit-check and a logging reaction for one
/// (group, opposing group) pairing.
pub fn overlap_rules(group: Group, opposing: Group, log: &ReactionLog) -> RuleBook {
    let mut rules = RuleBook::new();
    rules.register_hit_check(group, opposing, || {
        Box::new(|a, b| a.aabb().overlaps(&b.aabb()))
    });
    rules.register_reaction(group, opposing, logging_reaction(log));
    rules
}

// =============================================================================
// Spawning
// =============================================================================

/// Spawns a standard 8 by 12 actor at `position`.
pub fn spawn_slime(session: &mut Session, position: Vec2) -> EntityId {
    session.spawn(
        Group::Actor,
        KindId::new("slime"),
        position,
        Vec2::new(8.0, 12.0),
    )
}
