//! Physics configuration
//!
//! The world is tuned by a handful of constants. Most of them can be
//! overridden through [`PhysicsConfig`], which is layered the same way the
//! rest of the game configuration is:
//!
//! 1. Built-in defaults (the constants below)
//! 2. A TOML file, either top-level keys or a `[physics]` table
//! 3. Environment variables (`MASS_PHYSICS_*`)
//!
//! Gravity is not configurable.
//!
//! ```toml
//! [physics]
//! fixed_time_step = 0.016666668
//! max_sub_steps = 10
//! max_proxies = 1024
//!
//! [physics.world_bounds]
//! min = [-1000.0, -1000.0, -1000.0]
//! max = [1000.0, 1000.0, 1000.0]
//! ```

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// World gravity, fixed for the lifetime of a world
pub const GRAVITY: [f32; 3] = [0.0, -10.0, 0.0];

/// Simulated time advanced by a single [`tick`](crate::world::PhysicsWorld::tick)
pub const TICK_TIME_STEP: f32 = 1.0 / 60.0;

/// Default internal step length
pub const DEFAULT_FIXED_TIME_STEP: f32 = 1.0 / 60.0;

/// Default cap on internal steps per call
pub const DEFAULT_MAX_SUB_STEPS: u32 = 10;

/// Default number of broadphase proxies
pub const DEFAULT_MAX_PROXIES: usize = 1024;

/// Half extent of the default world box on every axis
pub const WORLD_HALF_EXTENT: f32 = 1000.0;

/// Ground plane normal
pub const GROUND_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// Ground plane constant along [`GROUND_NORMAL`], in the ground body's frame
pub const GROUND_PLANE_CONSTANT: f32 = 1.0;

/// Ground body position
pub const GROUND_ORIGIN: [f32; 3] = [0.0, -1.0, 0.0];

const ENV_FIXED_TIME_STEP: &str = "MASS_PHYSICS_FIXED_TIME_STEP";
const ENV_MAX_SUB_STEPS: &str = "MASS_PHYSICS_MAX_SUB_STEPS";
const ENV_MAX_PROXIES: &str = "MASS_PHYSICS_MAX_PROXIES";

/// Axis-aligned box the broadphase is sized to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Minimum corner
    pub min: [f32; 3],
    /// Maximum corner
    pub max: [f32; 3],
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::cube(WORLD_HALF_EXTENT)
    }
}

impl WorldBounds {
    /// Create bounds from two corners
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Cube centered on the origin
    pub fn cube(half_extent: f32) -> Self {
        Self {
            min: [-half_extent; 3],
            max: [half_extent; 3],
        }
    }

    /// Check that an AABB lies fully inside the bounds
    pub fn contains_aabb(&self, min: [f32; 3], max: [f32; 3]) -> bool {
        (0..3).all(|i| min[i] >= self.min[i] && max[i] <= self.max[i])
    }

    fn is_valid(&self) -> bool {
        (0..3).all(|i| {
            self.min[i].is_finite() && self.max[i].is_finite() && self.min[i] < self.max[i]
        })
    }
}

/// Physics world configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Length of one internal simulation step
    pub fixed_time_step: f32,

    /// Maximum internal steps per tick; surplus time is dropped
    pub max_sub_steps: u32,

    /// Region tracked by the broadphase
    pub world_bounds: WorldBounds,

    /// Maximum number of broadphase proxies, ground included
    pub max_proxies: usize,

    /// Velocity solver iterations per internal step
    pub solver_iterations: usize,

    /// Let resting bodies go to sleep
    pub sleeping_enabled: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_time_step: DEFAULT_FIXED_TIME_STEP,
            max_sub_steps: DEFAULT_MAX_SUB_STEPS,
            world_bounds: WorldBounds::default(),
            max_proxies: DEFAULT_MAX_PROXIES,
            solver_iterations: 4,
            sleeping_enabled: true,
        }
    }
}

/// Accepts both a bare config and one nested under `[physics]`
#[derive(Deserialize)]
struct ConfigFile {
    physics: Option<PhysicsConfig>,
    #[serde(flatten)]
    top_level: PhysicsConfig,
}

impl PhysicsConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let config = file.physics.unwrap_or(file.top_level);
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded physics config from {}", path.display());
        Ok(config)
    }

    /// Apply `MASS_PHYSICS_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_FIXED_TIME_STEP) {
            self.fixed_time_step = parse_override(ENV_FIXED_TIME_STEP, &value)?;
            log::info!("Fixed time step from env: {}", self.fixed_time_step);
        }

        if let Some(value) = lookup(ENV_MAX_SUB_STEPS) {
            self.max_sub_steps = parse_override(ENV_MAX_SUB_STEPS, &value)?;
            log::info!("Max sub-steps from env: {}", self.max_sub_steps);
        }

        if let Some(value) = lookup(ENV_MAX_PROXIES) {
            self.max_proxies = parse_override(ENV_MAX_PROXIES, &value)?;
            log::info!("Max proxies from env: {}", self.max_proxies);
        }

        self.validate()
    }

    /// Reject configurations the world cannot be built from
    pub fn validate(&self) -> Result<()> {
        if !(self.fixed_time_step.is_finite() && self.fixed_time_step > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "fixed_time_step must be positive, got {}",
                self.fixed_time_step
            )));
        }
        if !self.world_bounds.is_valid() {
            return Err(PhysicsError::InvalidConfig(format!(
                "world bounds {:?} are empty or not finite",
                self.world_bounds
            )));
        }
        if self.max_proxies == 0 {
            return Err(PhysicsError::InvalidConfig(
                "max_proxies must leave room for the ground plane".into(),
            ));
        }
        if self.solver_iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "solver_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Set the internal step length
    pub fn with_fixed_time_step(mut self, step: f32) -> Self {
        self.fixed_time_step = step;
        self
    }

    /// Set the internal step cap
    pub fn with_max_sub_steps(mut self, max_sub_steps: u32) -> Self {
        self.max_sub_steps = max_sub_steps;
        self
    }

    /// Set the broadphase bounds
    pub fn with_world_bounds(mut self, bounds: WorldBounds) -> Self {
        self.world_bounds = bounds;
        self
    }

    /// Set the broadphase proxy capacity
    pub fn with_max_proxies(mut self, max_proxies: usize) -> Self {
        self.max_proxies = max_proxies;
        self
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| PhysicsError::InvalidConfig(format!("{key}={value:?} is not a valid value")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = PhysicsConfig::default();
        assert_eq!(config.max_sub_steps, 10);
        assert_eq!(config.max_proxies, 1024);
        assert_eq!(config.world_bounds.min, [-1000.0; 3]);
        assert_eq!(config.world_bounds.max, [1000.0; 3]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_nested_table() {
        let config = PhysicsConfig::from_toml_str(
            r#"
            [physics]
            max_sub_steps = 4
            max_proxies = 16
            "#,
        )
        .unwrap();

        assert_eq!(config.max_sub_steps, 4);
        assert_eq!(config.max_proxies, 16);
        assert_eq!(config.fixed_time_step, DEFAULT_FIXED_TIME_STEP);
    }

    #[test]
    fn test_parse_top_level() {
        let config = PhysicsConfig::from_toml_str(
            r#"
            fixed_time_step = 0.01
            [world_bounds]
            min = [-10.0, -10.0, -10.0]
            max = [10.0, 10.0, 10.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.fixed_time_step, 0.01);
        assert_eq!(config.world_bounds, WorldBounds::cube(10.0));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            PhysicsConfig::from_toml_str("fixed_time_step = -1.0"),
            Err(PhysicsError::InvalidConfig(_))
        ));
        assert!(matches!(
            PhysicsConfig::from_toml_str("max_proxies = 0"),
            Err(PhysicsError::InvalidConfig(_))
        ));
        assert!(matches!(
            PhysicsConfig::from_toml_str("max_proxies = \"lots\""),
            Err(PhysicsError::ConfigParse(_))
        ));

        let inverted = PhysicsConfig::default()
            .with_world_bounds(WorldBounds::new([1.0; 3], [-1.0; 3]));
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = PhysicsConfig::default();
        config
            .apply_overrides_from(|key| match key {
                "MASS_PHYSICS_MAX_SUB_STEPS" => Some("3".to_string()),
                "MASS_PHYSICS_MAX_PROXIES" => Some(" 64 ".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.max_sub_steps, 3);
        assert_eq!(config.max_proxies, 64);

        let err = config
            .apply_overrides_from(|key| {
                (key == "MASS_PHYSICS_FIXED_TIME_STEP").then(|| "fast".to_string())
            })
            .unwrap_err();
        assert!(matches!(err, PhysicsError::InvalidConfig(_)));
    }
}
