//! Narrowphase collision dispatch

use crate::events::{CollisionEvent, EventCollector};
use rapier3d::prelude as rapier;

/// Finds out which candidate pairs are actually touching
///
/// Uses Rapier's default contact configuration and keeps the collision
/// events raised during the last step.
pub struct CollisionDispatcher {
    pub(crate) narrow_phase: rapier::NarrowPhase,
    pub(crate) events: EventCollector,
}

impl CollisionDispatcher {
    /// Create a dispatcher
    pub fn new() -> Self {
        Self {
            narrow_phase: rapier::NarrowPhase::new(),
            events: EventCollector::new(),
        }
    }

    /// Collision events from the last step
    pub fn collision_events(&self) -> &[CollisionEvent] {
        self.events.events()
    }
}

impl Default for CollisionDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
