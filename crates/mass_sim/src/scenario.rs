//! Drop scenario
//!
//! Spheres are stacked above the ground plane and dropped. The file format
//! shares the `[physics]` table with the world configuration:
//!
//! ```toml
//! [physics]
//! max_sub_steps = 10
//!
//! [scenario]
//! ticks = 240
//! spheres = 3
//! drop_height = 5.0
//! spacing = 1.5
//! radius = 0.5
//! mass = 1.0
//! report_every = 30
//! ```

use mass_physics::{BodyId, PhysicsConfig, PhysicsWorld, RigidBody, Transform};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scenario parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Number of frames to run
    pub ticks: u32,
    /// Number of spheres in the stack
    pub spheres: u32,
    /// Height of the lowest sphere
    pub drop_height: f32,
    /// Vertical gap between sphere centers
    pub spacing: f32,
    /// Sphere radius
    pub radius: f32,
    /// Sphere mass
    pub mass: f32,
    /// Log positions every N ticks (0 disables)
    pub report_every: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            ticks: 240,
            spheres: 1,
            drop_height: 5.0,
            spacing: 1.5,
            radius: 0.5,
            mass: 1.0,
            report_every: 30,
        }
    }
}

/// Complete simulator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Physics world settings
    pub physics: PhysicsConfig,
    /// Scenario settings
    pub scenario: ScenarioConfig,
}

impl SimConfig {
    /// Parse from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(content)?;
        config.physics.validate()?;
        Ok(config)
    }

    /// Load from the given file, or defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                log::info!("Loaded simulator config from {}", path.display());
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        config.physics.apply_env_overrides()?;
        Ok(config)
    }
}

/// Final state of one dropped sphere
#[derive(Debug, Clone, Copy)]
pub struct SphereReport {
    /// Body identity
    pub id: BodyId,
    /// Start height
    pub start_height: f32,
    /// Height after the last tick
    pub final_height: f32,
}

/// Outcome of a scenario run
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Simulated seconds
    pub simulated_time: f64,
    /// Contacts started over the whole run
    pub contacts_started: usize,
    /// Per-sphere results
    pub spheres: Vec<SphereReport>,
}

/// Build a world, drop the spheres and run the configured number of ticks
pub fn run(config: &SimConfig) -> mass_physics::Result<ScenarioReport> {
    let mut world = PhysicsWorld::with_config(config.physics.clone())?;
    let scenario = &config.scenario;

    let spheres: Vec<RigidBody> = (0..scenario.spheres)
        .map(|i| {
            let y = scenario.drop_height + i as f32 * scenario.spacing;
            RigidBody::sphere(scenario.mass, scenario.radius, Transform::from_translation(0.0, y, 0.0))
        })
        .collect();

    for sphere in &spheres {
        world.add_rigid_body(sphere)?;
    }
    let start_heights: Vec<f32> = spheres.iter().map(|s| s.transform().translation[1]).collect();

    let mut contacts_started = 0;
    for tick in 1..=scenario.ticks {
        world.tick();
        contacts_started += world.collision_events().iter().filter(|e| e.is_started()).count();

        if scenario.report_every > 0 && tick % scenario.report_every == 0 {
            for sphere in &spheres {
                log::info!(
                    "tick {:4} body {}: y = {:.3}",
                    tick,
                    sphere.id(),
                    sphere.transform().translation[1]
                );
            }
            log::debug!("{} of {} bodies awake", world.active_body_count(), world.body_count());
        }
    }

    Ok(ScenarioReport {
        simulated_time: world.simulated_time(),
        contacts_started,
        spheres: spheres
            .iter()
            .zip(start_heights)
            .map(|(sphere, start_height)| SphereReport {
                id: sphere.id(),
                start_height,
                final_height: sphere.transform().translation[1],
            })
            .collect(),
    })
}
