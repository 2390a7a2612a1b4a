// ==============================================================================
// engine.rs — TORQUE CURVE + RPM DYNAMICS
// ------------------------------------------------------------------------------
// Torque curve (parabola around the peak, floored so it never stalls to zero):
//
//     T(rpm) = max(T_peak − k (rpm − rpm_peak)², T_min)   for 0 <= rpm <= max
//     T(rpm) = 0                                          otherwise
//
// update():
//     combustion = T(rpm) · throttle
//     net        = combustion − rpm · friction − load
//     rpm       += (net / inertia) · dt · (60 / 2π)
//     rpm        = clamp(rpm, idle, max)
// ==============================================================================

use tracing::info;

use crate::config::EngineConfig;
use crate::math::{RAD_PER_SEC_TO_RPM, Real};

#[derive(Debug, Clone)]
pub struct Engine {
    pub max_rpm: Real,
    pub idle_rpm: Real,
    pub peak_torque: Real,    // N·m
    pub peak_rpm: Real,
    pub inertia: Real,        // kg·m²
    pub torque_curvature: Real,
    pub min_torque: Real,     // N·m
    pub friction_coeff: Real, // N·m per rpm

    rpm: Real,
}

impl Engine {
    pub fn new(cfg: &EngineConfig) -> Self {
        info!(
            idle = cfg.idle_rpm,
            max = cfg.max_rpm,
            peak_torque = cfg.peak_torque,
            "engine ready"
        );
        Self {
            max_rpm: cfg.max_rpm,
            idle_rpm: cfg.idle_rpm,
            peak_torque: cfg.peak_torque,
            peak_rpm: cfg.peak_rpm,
            inertia: cfg.inertia,
            torque_curvature: cfg.torque_curvature,
            min_torque: cfg.min_torque,
            friction_coeff: cfg.friction_coeff,
            rpm: cfg.idle_rpm,
        }
    }

    pub fn rpm(&self) -> Real { self.rpm }

    /// Rigid coupling from the wheels; held inside [idle, max].
    pub fn set_rpm(&mut self, rpm: Real) {
        self.rpm = if rpm.is_finite() { rpm.clamp(self.idle_rpm, self.max_rpm) } else { self.idle_rpm };
    }

    pub fn torque_curve(&self, rpm: Real) -> Real {
        if !(0.0..=self.max_rpm).contains(&rpm) {
            return 0.0;
        }
        let d = rpm - self.peak_rpm;
        (self.peak_torque - self.torque_curvature * d * d).max(self.min_torque)
    }

    /// Advances rpm and returns the combustion torque produced this tick.
    pub fn update(&mut self, dt: Real, throttle: Real, load_torque: Real) -> Real {
        let combustion = self.torque_curve(self.rpm) * throttle;
        let friction = self.rpm * self.friction_coeff;
        let net = combustion - friction - load_torque;

        if self.inertia > 0.0 {
            let angular_accel = net / self.inertia; // rad/s²
            self.rpm += angular_accel * dt * RAD_PER_SEC_TO_RPM;
        }
        self.set_rpm(self.rpm);

        combustion
    }

    pub fn reset(&mut self) {
        self.rpm = self.idle_rpm;
    }
}
