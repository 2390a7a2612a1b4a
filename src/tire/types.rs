//! Core shared types for `tire`.
// tire/types.rs
use std::fmt;

use serde::Serialize;

use crate::config::TireConfig;
use crate::math::{Real, Vec3, vec3};

// ============================================
// Wheel identification
// ============================================

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum WheelId { FL, FR, RL, RR }

impl WheelId {
    /// Corner order used by config offsets and every per-wheel array.
    pub const ALL: [WheelId; 4] = [WheelId::FL, WheelId::FR, WheelId::RL, WheelId::RR];

    pub fn index(&self) -> usize {
        match self {
            WheelId::FL => 0,
            WheelId::FR => 1,
            WheelId::RL => 2,
            WheelId::RR => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WheelId::FL => "FL",
            WheelId::FR => "FR",
            WheelId::RL => "RL",
            WheelId::RR => "RR",
        }
    }

    pub fn is_front(&self) -> bool {
        matches!(self, WheelId::FL | WheelId::FR)
    }

    /// Rear axle is the driven axle.
    pub fn is_rear(&self) -> bool {
        matches!(self, WheelId::RL | WheelId::RR)
    }
}

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// ----- forces -----
// ============================================

/// Output of the tire model for one contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TireForces {
    pub longitudinal: Real,    // N, +forward
    pub lateral: Real,         // N, +left
    pub aligning_moment: Real, // N·m about the contact normal
}

impl TireForces {
    pub const ZERO: TireForces = TireForces { longitudinal: 0.0, lateral: 0.0, aligning_moment: 0.0 };
}

// ============================================
// ----- per-corner tire state -----
// ============================================

#[derive(Debug, Clone)]
pub struct Tire {
    pub offset: Vec3,  // mount point, chassis local
    pub radius: Real,  // m

    wheel_speed: Real, // rad/s, held while airborne
    spin_angle: Real,  // rad, [0, 2π)
}

impl Tire {
    pub fn new(cfg: &TireConfig, offset: [Real; 3]) -> Self {
        Self {
            offset: vec3(offset),
            radius: cfg.radius,
            wheel_speed: 0.0,
            spin_angle: 0.0,
        }
    }

    pub fn wheel_speed(&self) -> Real { self.wheel_speed }
    pub fn spin_angle(&self) -> Real { self.spin_angle }

    /// Pure rolling: ω = v_long / r
    pub fn roll(&mut self, v_long: Real) {
        if self.radius > 0.0 {
            self.wheel_speed = v_long / self.radius;
        }
    }

    pub fn advance_spin(&mut self, dt: Real) {
        self.spin_angle = (self.spin_angle + self.wheel_speed * dt).rem_euclid(std::f32::consts::TAU);
    }

    pub fn reset(&mut self) {
        self.wheel_speed = 0.0;
        self.spin_angle = 0.0;
    }
}
