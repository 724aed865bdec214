//! Transforms and motion states
//!
//! A [`MotionState`] is the channel through which the simulation hands
//! body transforms back to the game. The caller seeds it with the starting
//! transform, keeps a clone, and reads the simulated transform after each
//! tick.

use parking_lot::RwLock;
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use std::sync::Arc;

/// Rigid transform: translation plus rotation quaternion (x, y, z, w)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub translation: [f32; 3],
    /// Orientation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
    };

    /// Pure translation
    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: [x, y, z],
            ..Self::IDENTITY
        }
    }

    /// Set rotation quaternion
    pub fn with_rotation(mut self, x: f32, y: f32, z: f32, w: f32) -> Self {
        self.rotation = [x, y, z, w];
        self
    }

    /// True when every component is finite and the rotation can be normalized
    pub fn is_valid(&self) -> bool {
        let finite = self
            .translation
            .iter()
            .chain(self.rotation.iter())
            .all(|v| v.is_finite());
        let norm_sq: f32 = self.rotation.iter().map(|v| v * v).sum();
        finite && norm_sq > 1.0e-6
    }

    pub(crate) fn to_isometry(self) -> Isometry3<f32> {
        let [x, y, z, w] = self.rotation;
        Isometry3::from_parts(
            Translation3::new(self.translation[0], self.translation[1], self.translation[2]),
            UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)),
        )
    }

    pub(crate) fn from_isometry(pose: &Isometry3<f32>) -> Self {
        let t = pose.translation.vector;
        let r = pose.rotation;
        Self {
            translation: [t.x, t.y, t.z],
            rotation: [r.i, r.j, r.k, r.w],
        }
    }
}

/// Pose advanced by `dt` seconds at constant velocity
pub(crate) fn integrate_transform(
    pose: &Isometry3<f32>,
    linvel: &Vector3<f32>,
    angvel: &Vector3<f32>,
    dt: f32,
) -> Isometry3<f32> {
    let translation = Translation3::from(pose.translation.vector + linvel * dt);
    let rotation = UnitQuaternion::new(angvel * dt) * pose.rotation;
    Isometry3::from_parts(translation, rotation)
}

/// Shared transform slot written by the simulation, read by the game
#[derive(Debug, Clone, Default)]
pub struct MotionState {
    transform: Arc<RwLock<Transform>>,
}

impl MotionState {
    /// Create a motion state seeded with a start transform
    pub fn new(start: Transform) -> Self {
        Self {
            transform: Arc::new(RwLock::new(start)),
        }
    }

    /// Latest world transform
    pub fn transform(&self) -> Transform {
        *self.transform.read()
    }

    /// Overwrite the world transform
    pub fn set_transform(&self, transform: Transform) {
        *self.transform.write() = transform;
    }

    /// Whether two motion states share the same slot
    pub fn ptr_eq(&self, other: &MotionState) -> bool {
        Arc::ptr_eq(&self.transform, &other.transform)
    }
}
