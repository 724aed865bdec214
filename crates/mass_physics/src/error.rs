//! Error types for the physics world

use crate::body::BodyId;
use thiserror::Error;

/// Physics world errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Body is already registered with this world
    #[error("Rigid body {0} is already registered")]
    DuplicateRegistration(BodyId),

    /// Body shares its motion state with a registered body
    #[error("Rigid body {body} shares its motion state with registered body {owner}")]
    SharedMotionState { body: BodyId, owner: BodyId },

    /// Body failed validation before registration
    #[error("Invalid rigid body: {0}")]
    InvalidBody(String),

    /// Rigid body not registered with this world
    #[error("Rigid body not found: {0}")]
    BodyNotFound(BodyId),

    /// Stale or foreign arena handle
    #[error("No rigid body behind handle {0:?}")]
    StaleHandle(crate::body::RigidBodyHandle),

    /// Broadphase is tracking as many proxies as it was sized for
    #[error("Broadphase proxy limit reached ({max} proxies)")]
    ProxyLimitReached { max: usize },

    /// Body starts outside the broadphase world bounds
    #[error("Rigid body {0} lies outside the world bounds")]
    OutOfWorldBounds(BodyId),

    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read
    #[error("Failed to read physics configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Configuration file is not valid TOML for [`crate::config::PhysicsConfig`]
    #[error("Failed to parse physics configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
