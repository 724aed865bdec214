//! Dynamics world - orchestrates broadphase, dispatcher and solver

use crate::body::BodyId;
use crate::broadphase::Broadphase;
use crate::config::GRAVITY;
use crate::dispatcher::CollisionDispatcher;
use crate::events::CollisionEvent;
use crate::solver::ConstraintSolver;
use rapier3d::prelude as rapier;

/// Integrates bodies and drives the collision pipeline
///
/// Takes ownership of its collaborators, so it can only exist once they
/// do. Fields drop in declaration order: simulation state first, then the
/// solver, the dispatcher and finally the broadphase.
pub struct DynamicsWorld {
    pipeline: rapier::PhysicsPipeline,
    pub(crate) islands: rapier::IslandManager,
    pub(crate) bodies: rapier::RigidBodySet,
    pub(crate) colliders: rapier::ColliderSet,
    gravity: rapier::Vector<f32>,
    pub(crate) solver: ConstraintSolver,
    pub(crate) dispatcher: CollisionDispatcher,
    pub(crate) broadphase: Broadphase,
}

impl DynamicsWorld {
    /// Bind a dynamics world to its collaborators
    pub fn new(
        broadphase: Broadphase,
        dispatcher: CollisionDispatcher,
        solver: ConstraintSolver,
    ) -> Self {
        Self {
            pipeline: rapier::PhysicsPipeline::new(),
            islands: rapier::IslandManager::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            gravity: rapier::Vector::new(GRAVITY[0], GRAVITY[1], GRAVITY[2]),
            solver,
            dispatcher,
            broadphase,
        }
    }

    /// World gravity
    pub fn gravity(&self) -> [f32; 3] {
        [self.gravity.x, self.gravity.y, self.gravity.z]
    }

    /// Insert a body together with its collider
    pub(crate) fn insert(
        &mut self,
        body: rapier::RigidBodyBuilder,
        collider: rapier::ColliderBuilder,
    ) -> (rapier::RigidBodyHandle, rapier::ColliderHandle) {
        let body = self.bodies.insert(body);
        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);
        (body, collider)
    }

    /// Remove a body and its attached colliders
    pub(crate) fn remove(&mut self, handle: rapier::RigidBodyHandle) -> bool {
        // Contacts of the removed colliders are reported as stopped during
        // the next step, after the colliders are gone
        if let Some(body) = self.bodies.get(handle) {
            let id = BodyId::from_user_data(body.user_data);
            for &collider in body.colliders() {
                self.dispatcher.events.remember_removed(collider, id);
            }
        }

        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.solver.impulse_joints,
                &mut self.solver.multibody_joints,
                true,
            )
            .is_some()
    }

    /// Advance the simulation by one step of `dt` seconds
    pub(crate) fn step(&mut self, dt: f32) {
        self.solver.params.dt = dt;
        let handler = self.dispatcher.events.handler();

        self.pipeline.step(
            &self.gravity,
            &self.solver.params,
            &mut self.islands,
            &mut self.broadphase.inner,
            &mut self.dispatcher.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.solver.impulse_joints,
            &mut self.solver.multibody_joints,
            &mut self.solver.ccd,
            None,
            &(),
            &handler,
        );

        self.dispatcher.events.collect(&self.colliders);
    }

    /// Forget events from the previous tick
    pub(crate) fn clear_events(&mut self) {
        self.dispatcher.events.clear();
    }

    /// Number of tracked broadphase proxies
    pub fn proxy_count(&self) -> usize {
        self.colliders.len()
    }

    /// Number of awake dynamic bodies
    pub fn active_body_count(&self) -> usize {
        self.islands.active_dynamic_bodies().len()
    }

    /// Collision events from the last step
    pub fn collision_events(&self) -> &[CollisionEvent] {
        self.dispatcher.collision_events()
    }

    /// The broadphase
    pub fn broadphase(&self) -> &Broadphase {
        &self.broadphase
    }
}
