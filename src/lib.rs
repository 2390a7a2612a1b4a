//! Real-time four-wheel vehicle dynamics.
//!
//! A single rigid chassis on four spring/damper corners, Magic-Formula tires,
//! an engine with an automatic or manual gearbox, all advanced by a
//! fixed-timestep accumulator. World is Z-up; chassis local +X forward,
//! +Y left, +Z up. Corner order everywhere is FL, FR, RL, RR.

pub mod config;
pub mod drivetrain;
pub mod environment;
pub mod error;
pub mod math;
pub mod physics;
pub mod rigid_body;
pub mod state;
pub mod suspension;
pub mod tire;
pub mod vehicle;

pub use config::{SimConfig, VehicleConfig};
pub use environment::{ColliderGround, Environment, FlatGround};
pub use error::ConfigError;
pub use physics::PhysicsEngine;
pub use state::{ControlInput, JsonLinesRenderer, Renderer, SimulationState};
pub use tire::WheelId;
pub use vehicle::{Vehicle, VehicleModel};
