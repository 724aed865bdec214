//! Physics world - owns the simulation and the ground plane

use crate::body::{BodyId, RigidBody, RigidBodyHandle};
use crate::broadphase::Broadphase;
use crate::config::{
    PhysicsConfig, WorldBounds, GROUND_NORMAL, GROUND_ORIGIN, GROUND_PLANE_CONSTANT,
    TICK_TIME_STEP,
};
use crate::dispatcher::CollisionDispatcher;
use crate::dynamics::DynamicsWorld;
use crate::error::{PhysicsError, Result};
use crate::events::CollisionEvent;
use crate::motion::{integrate_transform, MotionState, Transform};
use crate::shape::CollisionShape;
use crate::solver::ConstraintSolver;
use rapier3d::prelude as rapier;
use std::collections::HashMap;

/// A caller body registered with the world
struct Registration {
    handle: rapier::RigidBodyHandle,
    motion_state: MotionState,
}

/// The game's rigid-body simulation
///
/// Owns the dynamics world (and through it the broadphase, dispatcher and
/// solver) plus a static ground plane whose surface is `y = 0`. Bodies
/// added with [`add_rigid_body`](Self::add_rigid_body) stay owned by the
/// caller; the world tracks them by [`BodyId`].
pub struct PhysicsWorld {
    dynamics: DynamicsWorld,

    config: PhysicsConfig,

    /// Ground plane body, owned by the world
    ground: rapier::RigidBodyHandle,

    /// Registered caller bodies
    registry: HashMap<BodyId, Registration>,

    /// Time accumulated but not yet simulated
    local_time: f32,

    /// Total simulated time
    simulated_time: f64,
}

impl PhysicsWorld {
    /// Create a world with the default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
            .expect("default physics configuration is valid")
    }

    /// Create a world from a configuration
    pub fn with_config(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;

        let broadphase = Broadphase::new(config.world_bounds, config.max_proxies);
        let dispatcher = CollisionDispatcher::new();
        let solver = ConstraintSolver::new(config.fixed_time_step, config.solver_iterations)?;
        let mut dynamics = DynamicsWorld::new(broadphase, dispatcher, solver);

        let ground_shape = CollisionShape::static_plane(GROUND_NORMAL, GROUND_PLANE_CONSTANT);
        let ground_body = rapier::RigidBodyBuilder::fixed()
            .translation(rapier::Vector::new(
                GROUND_ORIGIN[0],
                GROUND_ORIGIN[1],
                GROUND_ORIGIN[2],
            ))
            .user_data(BodyId::GROUND.to_user_data());
        let ground_collider = ground_shape
            .to_rapier_builder()?
            .active_events(rapier::ActiveEvents::COLLISION_EVENTS)
            .user_data(BodyId::GROUND.to_user_data());
        let (ground, _) = dynamics.insert(ground_body, ground_collider);

        log::info!(
            "Physics world created: gravity {:?}, bounds {:?}, {} proxies, step {:.4}s x{}",
            dynamics.gravity(),
            config.world_bounds,
            config.max_proxies,
            config.fixed_time_step,
            config.max_sub_steps,
        );

        Ok(Self {
            dynamics,
            config,
            ground,
            registry: HashMap::new(),
            local_time: 0.0,
            simulated_time: 0.0,
        })
    }

    /// Get the physics configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Get gravity
    pub fn gravity(&self) -> [f32; 3] {
        self.dynamics.gravity()
    }

    /// Broadphase world bounds
    pub fn world_bounds(&self) -> WorldBounds {
        self.dynamics.broadphase().bounds()
    }

    /// Broadphase proxy capacity
    pub fn max_proxies(&self) -> usize {
        self.dynamics.broadphase().max_proxies()
    }

    // ==================== Rigid Bodies ====================

    /// Register a caller-owned body with the simulation
    pub fn add_rigid_body(&mut self, body: &RigidBody) -> Result<RigidBodyHandle> {
        let id = body.id();
        if self.registry.contains_key(&id) {
            log::warn!("Rejected duplicate registration of body {}", id);
            return Err(PhysicsError::DuplicateRegistration(id));
        }

        if let Some((owner, _)) = self
            .registry
            .iter()
            .find(|(_, r)| r.motion_state.ptr_eq(body.motion_state()))
        {
            log::warn!("Rejected body {}: motion state already driven by {}", id, owner);
            return Err(PhysicsError::SharedMotionState { body: id, owner: *owner });
        }

        body.info().validate()?;

        let start = body.transform();
        self.dynamics.broadphase().admit(
            id,
            body.shape().aabb_at(start.translation),
            self.dynamics.proxy_count(),
        )?;

        let rigid_body = body
            .info()
            .to_rapier_body(id)
            .can_sleep(self.config.sleeping_enabled);
        let collider = body.info().to_rapier_collider(id)?;
        let (handle, _) = self.dynamics.insert(rigid_body, collider);

        self.registry.insert(
            id,
            Registration {
                handle,
                motion_state: body.motion_state().clone(),
            },
        );

        log::debug!(
            "Registered body {} ({} kg) at {:?}",
            id,
            body.mass(),
            start.translation
        );
        Ok(RigidBodyHandle(handle))
    }

    /// Unregister a body; its motion state keeps the last written transform
    pub fn remove_rigid_body(&mut self, body: &RigidBody) -> Result<()> {
        let id = body.id();
        let registration = self
            .registry
            .remove(&id)
            .ok_or(PhysicsError::BodyNotFound(id))?;

        self.dynamics.remove(registration.handle);
        log::debug!("Removed body {}", id);
        Ok(())
    }

    /// Unregister the body behind a handle
    ///
    /// Works after the caller has dropped every copy of the body. The
    /// ground plane is not registered and cannot be removed.
    pub fn remove_by_handle(&mut self, handle: RigidBodyHandle) -> Result<()> {
        let id = self
            .registry
            .iter()
            .find(|(_, r)| r.handle == handle.0)
            .map(|(id, _)| *id)
            .ok_or(PhysicsError::StaleHandle(handle))?;

        self.registry.remove(&id);
        self.dynamics.remove(handle.0);
        log::debug!("Removed body {} by handle", id);
        Ok(())
    }

    /// Check whether a body is registered
    pub fn contains(&self, body: &RigidBody) -> bool {
        self.registry.contains_key(&body.id())
    }

    /// Handle of a registered body
    pub fn handle_of(&self, body: &RigidBody) -> Option<RigidBodyHandle> {
        self.registry
            .get(&body.id())
            .map(|r| RigidBodyHandle(r.handle))
    }

    /// Current transform of a body
    pub fn body_transform(&self, handle: RigidBodyHandle) -> Result<Transform> {
        self.dynamics
            .bodies
            .get(handle.0)
            .map(|b| Transform::from_isometry(b.position()))
            .ok_or(PhysicsError::StaleHandle(handle))
    }

    /// Current linear velocity of a body
    pub fn body_linear_velocity(&self, handle: RigidBodyHandle) -> Result<[f32; 3]> {
        self.dynamics
            .bodies
            .get(handle.0)
            .map(|b| {
                let vel = b.linvel();
                [vel.x, vel.y, vel.z]
            })
            .ok_or(PhysicsError::StaleHandle(handle))
    }

    /// Handle of the ground plane
    pub fn ground_handle(&self) -> RigidBodyHandle {
        RigidBodyHandle(self.ground)
    }

    /// Transform of the ground body
    pub fn ground_transform(&self) -> Transform {
        self.dynamics
            .bodies
            .get(self.ground)
            .map(|b| Transform::from_isometry(b.position()))
            .unwrap_or_else(|| {
                Transform::from_translation(GROUND_ORIGIN[0], GROUND_ORIGIN[1], GROUND_ORIGIN[2])
            })
    }

    // ==================== Simulation ====================

    /// Advance the simulation by one frame (1/60 s)
    pub fn tick(&mut self) {
        self.step_simulation(TICK_TIME_STEP, self.config.max_sub_steps);
    }

    /// Advance the simulation by `time_step` seconds
    ///
    /// Time is consumed in internal steps of `fixed_time_step`, at most
    /// `max_sub_steps` of them; leftover time carries over to the next call
    /// and is used to interpolate motion states. With `max_sub_steps == 0`
    /// a single step of exactly `time_step` is taken instead.
    ///
    /// Returns the number of internal steps performed.
    pub fn step_simulation(&mut self, time_step: f32, max_sub_steps: u32) -> u32 {
        if !(time_step.is_finite() && time_step >= 0.0) {
            log::warn!("Ignoring step of {} seconds", time_step);
            return 0;
        }

        self.dynamics.clear_events();

        let fixed = self.config.fixed_time_step;
        let (steps, step_length) = if max_sub_steps == 0 {
            self.local_time = 0.0;
            (u32::from(time_step > 0.0), time_step)
        } else {
            self.local_time += time_step;
            let due = (f64::from(self.local_time) / f64::from(fixed))
                .floor()
                .min(f64::from(u32::MAX)) as u32;
            // Leftover is always less than one step, even after a huge delta
            self.local_time = self.local_time.rem_euclid(fixed);

            if due > max_sub_steps {
                log::warn!(
                    "Simulation falling behind: dropping {} of {} steps",
                    due - max_sub_steps,
                    due
                );
            }
            (due.min(max_sub_steps), fixed)
        };

        for _ in 0..steps {
            log::trace!("Physics step {:.4}s", step_length);
            self.dynamics.step(step_length);
            self.simulated_time += f64::from(step_length);
        }

        self.synchronize_motion_states();
        steps
    }

    /// Write simulated transforms into the registered motion states
    fn synchronize_motion_states(&self) {
        let interpolation = self.local_time;

        for registration in self.registry.values() {
            let Some(body) = self.dynamics.bodies.get(registration.handle) else {
                continue;
            };

            let pose = if body.is_dynamic() && interpolation > 0.0 {
                integrate_transform(body.position(), body.linvel(), body.angvel(), interpolation)
            } else {
                *body.position()
            };

            registration
                .motion_state
                .set_transform(Transform::from_isometry(&pose));
        }
    }

    /// Total simulated time in seconds
    pub fn simulated_time(&self) -> f64 {
        self.simulated_time
    }

    // ==================== Events ====================

    /// Collision events from the last tick
    pub fn collision_events(&self) -> &[CollisionEvent] {
        self.dynamics.collision_events()
    }

    // ==================== Debug ====================

    /// Number of registered caller bodies (ground excluded)
    pub fn body_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of broadphase proxies in use (ground included)
    pub fn proxy_count(&self) -> usize {
        self.dynamics.proxy_count()
    }

    /// Number of active (awake) bodies
    pub fn active_body_count(&self) -> usize {
        self.dynamics.active_body_count()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PhysicsWorld {
    fn drop(&mut self) {
        log::info!(
            "Physics world torn down after {:.2}s simulated, {} bodies registered",
            self.simulated_time,
            self.registry.len()
        );
    }
}
