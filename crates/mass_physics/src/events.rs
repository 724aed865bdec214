//! Collision events reported by the dispatcher

use crate::body::BodyId;
use crossbeam_channel::{Receiver, Sender};
use rapier3d::prelude as rapier;
use std::collections::HashMap;

/// Type of collision event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEventType {
    /// Contact started
    Started,
    /// Contact ended
    Stopped,
}

/// A contact change between two bodies during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    /// First body
    pub body1: BodyId,
    /// Second body
    pub body2: BodyId,
    /// Event type
    pub event_type: CollisionEventType,
}

impl CollisionEvent {
    /// Check if this is a start event
    pub fn is_started(&self) -> bool {
        self.event_type == CollisionEventType::Started
    }

    /// Check if this is a stop event
    pub fn is_stopped(&self) -> bool {
        self.event_type == CollisionEventType::Stopped
    }

    /// Check if the event involves a body
    pub fn involves(&self, body: BodyId) -> bool {
        self.body1 == body || self.body2 == body
    }
}

/// Buffers collision events for one tick
///
/// Rapier reports events through a shared reference while the step holds
/// mutable borrows on the sets, so they go through a channel and are
/// resolved to [`BodyId`]s afterwards.
pub(crate) struct EventCollector {
    sender: Sender<rapier::CollisionEvent>,
    receiver: Receiver<rapier::CollisionEvent>,
    events: Vec<CollisionEvent>,
    /// Owners of colliders removed since the last collect
    removed: HashMap<rapier::ColliderHandle, BodyId>,
}

impl EventCollector {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            sender,
            receiver,
            events: Vec::new(),
            removed: HashMap::new(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }

    pub(crate) fn handler(&self) -> ChannelEventHandler {
        ChannelEventHandler {
            collision_events: self.sender.clone(),
        }
    }

    pub(crate) fn remember_removed(
        &mut self,
        collider: rapier::ColliderHandle,
        owner: BodyId,
    ) {
        self.removed.insert(collider, owner);
    }

    fn owner_of(
        &self,
        colliders: &rapier::ColliderSet,
        handle: rapier::ColliderHandle,
    ) -> Option<BodyId> {
        colliders
            .get(handle)
            .map(|c| BodyId::from_user_data(c.user_data))
            .or_else(|| self.removed.get(&handle).copied())
    }

    /// Drain raw events, resolving colliders to body ids
    pub(crate) fn collect(&mut self, colliders: &rapier::ColliderSet) {
        while let Ok(event) = self.receiver.try_recv() {
            let (h1, h2, event_type) = match event {
                rapier::CollisionEvent::Started(h1, h2, _) => (h1, h2, CollisionEventType::Started),
                rapier::CollisionEvent::Stopped(h1, h2, _) => (h1, h2, CollisionEventType::Stopped),
            };

            let (Some(body1), Some(body2)) =
                (self.owner_of(colliders, h1), self.owner_of(colliders, h2))
            else {
                continue;
            };

            let event = CollisionEvent {
                body1,
                body2,
                event_type,
            };
            log::debug!(
                "Collision {:?} between {} and {}",
                event.event_type,
                event.body1,
                event.body2
            );
            self.events.push(event);
        }
        self.removed.clear();
    }

    pub(crate) fn events(&self) -> &[CollisionEvent] {
        &self.events
    }
}

/// Channel-based event handler passed to the Rapier pipeline
pub(crate) struct ChannelEventHandler {
    collision_events: Sender<rapier::CollisionEvent>,
}

impl rapier::EventHandler for ChannelEventHandler {
    fn handle_collision_event(
        &self,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        event: rapier::CollisionEvent,
        _contact_pair: Option<&rapier::ContactPair>,
    ) {
        let _ = self.collision_events.send(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        _contact_pair: &rapier::ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}
