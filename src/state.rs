use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::math::{Quat, Real, Vec3};
use crate::tire::WheelId;

/// Driver controls. Single slot, last write wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlInput {
    pub throttle: Real, // 0..1
    pub brake: Real,    // 0..1
    pub steering: Real, // -1 (right) .. 1 (left)
}

impl ControlInput {
    pub fn new(throttle: Real, brake: Real, steering: Real) -> Self {
        Self { throttle, brake, steering }
    }

    /// Ranges enforced, non-finite values dropped to 0.
    pub fn clamped(&self) -> Self {
        #[inline]
        fn fix(v: Real, lo: Real, hi: Real) -> Real {
            if v.is_finite() { v.clamp(lo, hi) } else { 0.0 }
        }
        Self {
            throttle: fix(self.throttle, 0.0, 1.0),
            brake: fix(self.brake, 0.0, 1.0),
            steering: fix(self.steering, -1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WheelTransform {
    pub position: Vec3, // hub center, world
    pub orientation: Quat,
}

impl Default for WheelTransform {
    fn default() -> Self {
        Self { position: Vec3::zeros(), orientation: Quat::identity() }
    }
}

/// Per-corner numbers for telemetry / debug overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WheelTelemetry {
    pub id: WheelId,
    pub grounded: bool,
    pub compression: Real,      // m, raw (negative when airborne)
    pub suspension_force: Real, // N, after the ≥ 0 clamp
    pub steer_angle: Real,      // rad
    pub slip_angle: Real,       // rad
    pub wheel_speed: Real,      // rad/s
    pub tractive_force: Real,   // N, after combined clamp
    pub lateral_force: Real,    // N, after combined clamp
    pub aligning_moment: Real,  // N·m, reported only
    pub skid: Real,             // 0..1
}

impl WheelTelemetry {
    pub fn idle(id: WheelId) -> Self {
        Self {
            id,
            grounded: false,
            compression: 0.0,
            suspension_force: 0.0,
            steer_angle: 0.0,
            slip_angle: 0.0,
            wheel_speed: 0.0,
            tractive_force: 0.0,
            lateral_force: 0.0,
            aligning_moment: 0.0,
            skid: 0.0,
        }
    }
}

/// Read-only snapshot produced every fixed tick. Owned values only, so a
/// consumer can hold it while the simulation keeps mutating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationState {
    pub timestamp: f64, // s of simulated time
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Quat,
    pub angular_velocity: Vec3,
    pub wheels: [WheelTransform; 4],
    pub skids: [Real; 4],
    pub engine_rpm: Real,
    pub gear: i32,
    pub engine_torque: Real, // N·m at current rpm, full throttle
    pub wheel_telemetry: [WheelTelemetry; 4],
}

impl SimulationState {
    pub fn wheel(&self, id: WheelId) -> &WheelTelemetry {
        &self.wheel_telemetry[id.index()]
    }

    pub fn speed(&self) -> Real {
        self.velocity.norm()
    }
}

/// Consumer of snapshots (renderer, audio, telemetry, transport).
pub trait Renderer {
    fn render(&mut self, state: &SimulationState);
}

/// Writes one JSON object per snapshot.
pub struct JsonLinesRenderer<W: Write> {
    out: W,
    written: u64,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn written(&self) -> u64 { self.written }

    pub fn into_inner(self) -> W { self.out }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn render(&mut self, state: &SimulationState) {
        let res = serde_json::to_writer(&mut self.out, state)
            .map_err(std::io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"));
        match res {
            Ok(()) => self.written += 1,
            Err(e) => warn!(error = %e, "snapshot write failed"),
        }
    }
}
