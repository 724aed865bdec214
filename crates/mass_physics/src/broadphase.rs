//! Broadphase sized to the world bounds
//!
//! Rapier's broadphase is unbounded, so the bounds and proxy capacity are
//! enforced when bodies are admitted rather than by the structure itself.

use crate::body::BodyId;
use crate::config::WorldBounds;
use crate::error::{PhysicsError, Result};
use rapier3d::prelude as rapier;

/// Candidate-pair finder for the dynamics world
pub struct Broadphase {
    pub(crate) inner: rapier::DefaultBroadPhase,
    bounds: WorldBounds,
    max_proxies: usize,
}

impl Broadphase {
    /// Create a broadphase for a world box and proxy capacity
    pub fn new(bounds: WorldBounds, max_proxies: usize) -> Self {
        Self {
            inner: rapier::DefaultBroadPhase::new(),
            bounds,
            max_proxies,
        }
    }

    /// World bounds
    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Proxy capacity
    pub fn max_proxies(&self) -> usize {
        self.max_proxies
    }

    /// Check that a new proxy fits
    pub(crate) fn admit(
        &self,
        id: BodyId,
        aabb: Option<([f32; 3], [f32; 3])>,
        proxy_count: usize,
    ) -> Result<()> {
        if proxy_count >= self.max_proxies {
            return Err(PhysicsError::ProxyLimitReached {
                max: self.max_proxies,
            });
        }
        if let Some((min, max)) = aabb {
            if !self.bounds.contains_aabb(min, max) {
                return Err(PhysicsError::OutOfWorldBounds(id));
            }
        }
        Ok(())
    }
}
