//! Mass physics simulator
//!
//! Runs the physics world headless: drops spheres onto the ground plane
//! and logs where they end up.
//!
//! Run with: cargo run -p mass_sim -- [config.toml]
//!
//! Environment:
//! - `RUST_LOG` - log filter (default `info`)
//! - `MASS_PHYSICS_*` - physics overrides, see `mass_physics::config`

mod scenario;

use scenario::SimConfig;
use std::path::PathBuf;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // First non-flag argument is the config file
    let config_path = std::env::args()
        .skip(1)
        .find(|arg| !arg.starts_with("--"))
        .map(PathBuf::from);

    let config = match SimConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };

    match scenario::run(&config) {
        Ok(report) => {
            log::info!(
                "Simulated {:.2}s, {} contacts started",
                report.simulated_time,
                report.contacts_started
            );
            for sphere in &report.spheres {
                log::info!(
                    "body {}: {:.3} -> {:.3}",
                    sphere.id,
                    sphere.start_height,
                    sphere.final_height
                );
            }
        }
        Err(e) => {
            log::error!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    }
}
