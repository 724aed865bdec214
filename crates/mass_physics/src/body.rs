//! Rigid bodies and their construction info

use crate::error::{PhysicsError, Result};
use crate::motion::{MotionState, Transform};
use crate::shape::CollisionShape;
use rapier3d::prelude as rapier;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BODY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a rigid body, shared by all of its clones
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(u64);

impl BodyId {
    /// Reserved for the ground plane owned by the world
    pub const GROUND: Self = Self(0);

    fn next() -> Self {
        Self(NEXT_BODY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn to_user_data(self) -> u128 {
        self.0 as u128
    }

    pub(crate) fn from_user_data(data: u128) -> Self {
        Self(data as u64)
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::GROUND {
            write!(f, "ground")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub(crate) rapier::RigidBodyHandle);

/// Everything needed to build a rigid body
#[derive(Debug, Clone)]
pub struct RigidBodyConstructionInfo {
    /// Mass in kg; zero makes the body static
    pub mass: f32,
    /// Start transform in, simulated transform out
    pub motion_state: MotionState,
    /// Collision shape
    pub shape: CollisionShape,
    /// Principal inertia override; derived from the shape when `None`
    pub local_inertia: Option<[f32; 3]>,
    /// Friction coefficient
    pub friction: f32,
    /// Restitution (bounciness)
    pub restitution: f32,
    /// Linear damping
    pub linear_damping: f32,
    /// Angular damping
    pub angular_damping: f32,
}

impl RigidBodyConstructionInfo {
    /// Create construction info with default surface and damping values
    pub fn new(mass: f32, motion_state: MotionState, shape: CollisionShape) -> Self {
        Self {
            mass,
            motion_state,
            shape,
            local_inertia: None,
            friction: 0.5,
            restitution: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    /// Override the principal inertia
    pub fn with_local_inertia(mut self, inertia: [f32; 3]) -> Self {
        self.local_inertia = Some(inertia);
        self
    }

    /// Set friction
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Set restitution
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set linear and angular damping
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    /// Check that the body can be handed to the world
    pub fn validate(&self) -> Result<()> {
        if !(self.mass.is_finite() && self.mass >= 0.0) {
            return Err(PhysicsError::InvalidBody(format!(
                "mass must be finite and non-negative, got {}",
                self.mass
            )));
        }
        self.shape.validate()?;
        if self.mass > 0.0 && self.shape.is_static_only() {
            return Err(PhysicsError::InvalidBody(
                "a static plane cannot belong to a dynamic body".into(),
            ));
        }
        if !self.motion_state.transform().is_valid() {
            return Err(PhysicsError::InvalidBody(
                "start transform is not finite or has a zero rotation".into(),
            ));
        }
        if let Some(inertia) = self.local_inertia {
            if inertia.iter().any(|i| !i.is_finite() || *i < 0.0) {
                return Err(PhysicsError::InvalidBody(format!(
                    "local inertia {inertia:?} must be finite and non-negative"
                )));
            }
        }
        let scalars = [
            self.friction,
            self.restitution,
            self.linear_damping,
            self.angular_damping,
        ];
        if scalars.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(PhysicsError::InvalidBody(
                "friction, restitution and damping must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn to_rapier_body(&self, id: BodyId) -> rapier::RigidBodyBuilder {
        let body_type = if self.is_static() {
            rapier::RigidBodyType::Fixed
        } else {
            rapier::RigidBodyType::Dynamic
        };

        rapier::RigidBodyBuilder::new(body_type)
            .position(self.motion_state.transform().to_isometry())
            .linear_damping(self.linear_damping)
            .angular_damping(self.angular_damping)
            .user_data(id.to_user_data())
    }

    pub(crate) fn to_rapier_collider(&self, id: BodyId) -> Result<rapier::ColliderBuilder> {
        let mut builder = self
            .shape
            .to_rapier_builder()?
            .friction(self.friction)
            .restitution(self.restitution)
            .active_events(rapier::ActiveEvents::COLLISION_EVENTS)
            .user_data(id.to_user_data());

        if !self.is_static() {
            builder = match self.local_inertia {
                Some([ix, iy, iz]) => builder.mass_properties(rapier::MassProperties::new(
                    rapier::Point::origin(),
                    self.mass,
                    rapier::Vector::new(ix, iy, iz),
                )),
                None => builder.mass(self.mass),
            };
        }

        Ok(builder)
    }

    fn is_static(&self) -> bool {
        self.mass == 0.0
    }
}

/// A rigid body owned by the caller
///
/// Cloning yields another reference to the same body: clones share the
/// [`BodyId`] and the motion state. The world only ever keeps the id and a
/// motion-state reference, so dropping a registered body is safe.
#[derive(Debug, Clone)]
pub struct RigidBody {
    id: BodyId,
    info: RigidBodyConstructionInfo,
}

impl RigidBody {
    /// Create a rigid body with a fresh identity
    pub fn new(info: RigidBodyConstructionInfo) -> Self {
        Self {
            id: BodyId::next(),
            info,
        }
    }

    /// Convenience constructor for a dynamic sphere
    pub fn sphere(mass: f32, radius: f32, start: Transform) -> Self {
        Self::new(RigidBodyConstructionInfo::new(
            mass,
            MotionState::new(start),
            CollisionShape::sphere(radius),
        ))
    }

    /// Body identity
    pub fn id(&self) -> BodyId {
        self.id
    }

    /// Construction info
    pub fn info(&self) -> &RigidBodyConstructionInfo {
        &self.info
    }

    /// Mass in kg
    pub fn mass(&self) -> f32 {
        self.info.mass
    }

    /// Static bodies have zero mass
    pub fn is_static(&self) -> bool {
        self.info.is_static()
    }

    /// Collision shape
    pub fn shape(&self) -> &CollisionShape {
        &self.info.shape
    }

    /// Motion state shared with the simulation
    pub fn motion_state(&self) -> &MotionState {
        &self.info.motion_state
    }

    /// Latest transform written by the simulation
    pub fn transform(&self) -> Transform {
        self.info.motion_state.transform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_shared_by_clones() {
        let a = RigidBody::sphere(1.0, 0.5, Transform::IDENTITY);
        let b = RigidBody::sphere(1.0, 0.5, Transform::IDENTITY);
        let a2 = a.clone();

        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a2.id());
        assert_ne!(a.id(), BodyId::GROUND);
        assert!(a.motion_state().ptr_eq(a2.motion_state()));
    }

    #[test]
    fn test_validate() {
        let state = MotionState::new(Transform::IDENTITY);
        let ok = RigidBodyConstructionInfo::new(1.0, state.clone(), CollisionShape::sphere(0.5));
        assert!(ok.validate().is_ok());

        let negative = RigidBodyConstructionInfo::new(-1.0, state.clone(), CollisionShape::sphere(0.5));
        assert!(matches!(negative.validate(), Err(PhysicsError::InvalidBody(_))));

        let dynamic_plane = RigidBodyConstructionInfo::new(
            1.0,
            state.clone(),
            CollisionShape::static_plane([0.0, 1.0, 0.0], 0.0),
        );
        assert!(dynamic_plane.validate().is_err());

        let static_plane = RigidBodyConstructionInfo::new(
            0.0,
            state,
            CollisionShape::static_plane([0.0, 1.0, 0.0], 0.0),
        );
        assert!(static_plane.validate().is_ok());

        let bad_start = RigidBodyConstructionInfo::new(
            1.0,
            MotionState::new(Transform::from_translation(0.0, f32::INFINITY, 0.0)),
            CollisionShape::sphere(0.5),
        );
        assert!(bad_start.validate().is_err());

        let bad_friction = ok.with_friction(f32::NAN);
        assert!(bad_friction.validate().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(BodyId::GROUND.to_string(), "ground");
        assert_eq!(BodyId::from_user_data(7).to_string(), "#7");
    }
}
