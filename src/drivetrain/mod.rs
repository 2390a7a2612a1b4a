//! drivetrain - engine torque/rpm model and the gearbox.

pub mod engine;
pub mod transmission;

pub use engine::Engine;
pub use transmission::{GearChange, ShiftMode, Transmission};
