//! Mass Physics - Rapier 3D rigid-body world
//!
//! Wires a broadphase, a collision dispatcher and a constraint solver into a
//! dynamics world, adds a static ground plane and steps the simulation at a
//! fixed 60 Hz.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  PhysicsWorld                    │
//! │  ground plane · body registry · step accumulator │
//! │  ┌────────────────────────────────────────────┐  │
//! │  │               DynamicsWorld                │  │
//! │  │  RigidBodySet · ColliderSet · gravity      │  │
//! │  │  ┌──────────┐ ┌────────────┐ ┌──────────┐  │  │
//! │  │  │Broadphase│ │ Dispatcher │ │  Solver  │  │  │
//! │  │  └──────────┘ └────────────┘ └──────────┘  │  │
//! │  └────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────┘
//!                         ▲
//!                         │ BodyId + MotionState
//!                  ┌──────┴──────┐
//!                  │  RigidBody  │  (owned by the game)
//!                  └─────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use mass_physics::prelude::*;
//!
//! let mut physics = PhysicsWorld::new();
//!
//! let ball = RigidBody::sphere(1.0, 0.5, Transform::from_translation(0.0, 5.0, 0.0));
//! physics.add_rigid_body(&ball).unwrap();
//!
//! for _ in 0..120 {
//!     physics.tick();
//! }
//!
//! let y = ball.transform().translation[1];
//! assert!((y - 0.5).abs() < 0.1);
//! ```

pub mod body;
pub mod broadphase;
pub mod config;
pub mod dispatcher;
pub mod dynamics;
pub mod error;
pub mod events;
pub mod motion;
pub mod shape;
pub mod solver;
pub mod world;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::body::{BodyId, RigidBody, RigidBodyConstructionInfo, RigidBodyHandle};
    pub use crate::config::{PhysicsConfig, WorldBounds};
    pub use crate::error::{PhysicsError, Result};
    pub use crate::events::{CollisionEvent, CollisionEventType};
    pub use crate::motion::{MotionState, Transform};
    pub use crate::shape::CollisionShape;
    pub use crate::world::PhysicsWorld;
}

pub use prelude::*;
