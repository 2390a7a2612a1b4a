//! Error types for vehicle / simulation construction.

use thiserror::Error;

/// Structural problems with a configuration, reported at construction time.
///
/// Steady-state stepping never returns errors; numeric oddities there are
/// absorbed by clamps.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Every per-corner computation assumes exactly four wheels.
    #[error("expected {expected} tire offsets, got {actual}")]
    TireCount { expected: usize, actual: usize },

    #[error("transmission needs at least one forward gear")]
    EmptyGearTable,

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("idle rpm ({idle}) must be below max rpm ({max})")]
    InvalidRpmRange { idle: f32, max: f32 },

    #[error("{field} is not finite")]
    NonFinite { field: &'static str },
}

impl ConfigError {
    pub(crate) fn non_positive(field: &'static str, value: impl Into<f64>) -> Self {
        Self::NonPositive { field, value: value.into() }
    }
}
