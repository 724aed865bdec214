//! Collision shapes

use crate::error::{PhysicsError, Result};
use rapier3d::na::{Unit, Vector3};
use rapier3d::prelude as rapier;

/// Collision shape of a rigid body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionShape {
    /// Sphere centered on the body origin
    Sphere { radius: f32 },
    /// Infinite plane `dot(normal, p) = constant` in the body frame;
    /// everything behind the plane is solid
    StaticPlane { normal: [f32; 3], constant: f32 },
}

impl CollisionShape {
    /// Create a sphere shape
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Create a static plane shape
    pub fn static_plane(normal: [f32; 3], constant: f32) -> Self {
        Self::StaticPlane { normal, constant }
    }

    /// Whether this shape may only be used on static bodies
    pub fn is_static_only(&self) -> bool {
        matches!(self, Self::StaticPlane { .. })
    }

    /// Reject degenerate shapes
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Sphere { radius } => {
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(PhysicsError::InvalidBody(format!(
                        "sphere radius must be positive, got {radius}"
                    )));
                }
            }
            Self::StaticPlane { normal, constant } => {
                if !constant.is_finite() || plane_normal(normal).is_none() {
                    return Err(PhysicsError::InvalidBody(format!(
                        "plane normal {normal:?} / constant {constant} is degenerate"
                    )));
                }
            }
        }
        Ok(())
    }

    /// World-space AABB at a body position, `None` for unbounded shapes
    pub fn aabb_at(&self, position: [f32; 3]) -> Option<([f32; 3], [f32; 3])> {
        match *self {
            Self::Sphere { radius } => Some((
                position.map(|c| c - radius),
                position.map(|c| c + radius),
            )),
            Self::StaticPlane { .. } => None,
        }
    }

    /// Build a Rapier collider builder, offset for plane constants
    pub(crate) fn to_rapier_builder(&self) -> Result<rapier::ColliderBuilder> {
        self.validate()?;
        let builder = match *self {
            Self::Sphere { radius } => rapier::ColliderBuilder::ball(radius),
            Self::StaticPlane { normal, constant } => {
                // validate() guarantees a normalizable normal
                let normal = plane_normal(normal).ok_or_else(|| {
                    PhysicsError::InvalidBody("degenerate plane normal".into())
                })?;
                rapier::ColliderBuilder::halfspace(normal).translation(normal.into_inner() * constant)
            }
        };
        Ok(builder)
    }
}

fn plane_normal(normal: [f32; 3]) -> Option<Unit<Vector3<f32>>> {
    if normal.iter().any(|c| !c.is_finite()) {
        return None;
    }
    Unit::try_new(Vector3::new(normal[0], normal[1], normal[2]), 1.0e-6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(CollisionShape::sphere(0.5).validate().is_ok());
        assert!(CollisionShape::sphere(0.0).validate().is_err());
        assert!(CollisionShape::sphere(f32::NAN).validate().is_err());
        assert!(CollisionShape::static_plane([0.0, 1.0, 0.0], 1.0).validate().is_ok());
        assert!(CollisionShape::static_plane([0.0, 0.0, 0.0], 1.0).validate().is_err());
    }

    #[test]
    fn test_sphere_aabb() {
        let (min, max) = CollisionShape::sphere(0.5).aabb_at([0.0, 5.0, 0.0]).unwrap();
        assert_eq!(min, [-0.5, 4.5, -0.5]);
        assert_eq!(max, [0.5, 5.5, 0.5]);
        assert!(CollisionShape::static_plane([0.0, 1.0, 0.0], 0.0).aabb_at([0.0; 3]).is_none());
    }

    #[test]
    fn test_plane_is_static_only() {
        assert!(CollisionShape::static_plane([0.0, 1.0, 0.0], 1.0).is_static_only());
        assert!(!CollisionShape::sphere(1.0).is_static_only());
    }
}
