//! Constraint solver state

use crate::error::{PhysicsError, Result};
use rapier3d::prelude as rapier;
use std::num::NonZeroUsize;

/// Resolves contact and joint constraints
pub struct ConstraintSolver {
    pub(crate) params: rapier::IntegrationParameters,
    pub(crate) impulse_joints: rapier::ImpulseJointSet,
    pub(crate) multibody_joints: rapier::MultibodyJointSet,
    pub(crate) ccd: rapier::CCDSolver,
}

impl ConstraintSolver {
    /// Create a solver stepping `time_step` seconds with `iterations` passes
    pub fn new(time_step: f32, iterations: usize) -> Result<Self> {
        let iterations = NonZeroUsize::new(iterations).ok_or_else(|| {
            PhysicsError::InvalidConfig("solver_iterations must be at least 1".into())
        })?;

        let mut params = rapier::IntegrationParameters::default();
        params.dt = time_step;
        params.num_solver_iterations = iterations;

        Ok(Self {
            params,
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd: rapier::CCDSolver::new(),
        })
    }

    /// Solver iterations per step
    pub fn iterations(&self) -> usize {
        self.params.num_solver_iterations.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let solver = ConstraintSolver::new(1.0 / 60.0, 4).unwrap();
        assert_eq!(solver.iterations(), 4);
        assert!(matches!(
            ConstraintSolver::new(1.0 / 60.0, 0),
            Err(PhysicsError::InvalidConfig(_))
        ));
    }
}
