// src/config.rs
//
// Vehicle parameters (supplied once, immutable for the run) and simulation
// parameters that would otherwise be process-wide constants. Everything is
// serde-friendly so an external loader can read it from JSON; this crate never
// touches the filesystem.

use serde::{Deserialize, Serialize};

use crate::drivetrain::ShiftMode;
use crate::error::ConfigError;
use crate::math::Real;
use crate::rigid_body::InertiaModel;
use crate::tire::magic_formula::{DEFAULT_PNEUMATIC_TRAIL, MagicFormulaCoefficients};

pub const WHEEL_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleConfig {
    pub mass: Real,          // kg
    pub inertia: [Real; 3],  // kg·m² (roll, pitch, yaw)
    pub suspension: SuspensionConfig,
    pub tires: TireConfig,
    pub drivetrain: DrivetrainConfig,

    #[serde(default)]
    pub handling: HandlingConfig,
    #[serde(default)]
    pub aero: AeroConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspensionConfig {
    pub stiffness: Real,   // N/m
    pub damping: Real,     // N·s/m
    pub rest_length: Real, // m
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TireConfig {
    pub radius: Real,               // m
    pub offsets: Vec<[Real; 3]>,    // chassis local, order FL FR RL RR

    #[serde(default = "lateral_coefficients")]
    pub lateral: MagicFormulaCoefficients,
    #[serde(default = "longitudinal_coefficients")]
    pub longitudinal: MagicFormulaCoefficients,
    #[serde(default = "pneumatic_trail")]
    pub pneumatic_trail: Real,      // m
}

fn lateral_coefficients() -> MagicFormulaCoefficients { MagicFormulaCoefficients::LATERAL }
fn longitudinal_coefficients() -> MagicFormulaCoefficients { MagicFormulaCoefficients::LONGITUDINAL }
fn pneumatic_trail() -> Real { DEFAULT_PNEUMATIC_TRAIL }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrivetrainConfig {
    pub engine: EngineConfig,
    pub transmission: TransmissionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(alias = "maxRPM")]
    pub max_rpm: Real,
    #[serde(alias = "idleRPM")]
    pub idle_rpm: Real,
    pub peak_torque: Real, // N·m
    #[serde(alias = "peakRPM")]
    pub peak_rpm: Real,
    pub inertia: Real,     // kg·m²

    #[serde(default = "torque_curvature")]
    pub torque_curvature: Real, // N·m / rpm²
    #[serde(default = "min_torque")]
    pub min_torque: Real,       // N·m
    #[serde(default = "friction_coeff")]
    pub friction_coeff: Real,   // N·m / rpm
}

fn torque_curvature() -> Real { 2.0e-5 }
fn min_torque() -> Real { 50.0 }
fn friction_coeff() -> Real { 0.01 }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransmissionConfig {
    pub gears: Vec<Real>,
    pub final_drive: Real,

    #[serde(default = "reverse_ratio")]
    pub reverse_ratio: Real,  // overall (final drive included)
    #[serde(default = "upshift_rpm")]
    pub upshift_rpm: Real,
    #[serde(default = "downshift_rpm")]
    pub downshift_rpm: Real,
    #[serde(default = "shift_cooldown")]
    pub shift_cooldown: Real, // s
    #[serde(default)]
    pub mode: ShiftMode,
}

fn reverse_ratio() -> Real { -12.0 }
fn upshift_rpm() -> Real { 6000.0 }
fn downshift_rpm() -> Real { 2500.0 }
fn shift_cooldown() -> Real { 0.5 }

/// Per-tick tuning used by the vehicle orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HandlingConfig {
    pub max_steer_angle: Real,      // rad at steering = ±1
    pub brake_force: Real,          // N per corner at brake = 1
    pub friction_cap: Real,         // combined-slip limit, × load
    pub slip_deadband: Real,        // m/s, |v_long| below which α = 0
    pub skid_slip_threshold: Real,  // rad, skid ramp start
    pub skid_slip_gain: Real,       // 1/rad, skid ramp slope
}

impl Default for HandlingConfig {
    fn default() -> Self {
        Self {
            max_steer_angle: 0.5,
            brake_force: 4000.0,
            friction_cap: 1.5,
            slip_deadband: 0.5,
            skid_slip_threshold: 0.15,
            skid_slip_gain: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AeroConfig {
    pub drag_coefficient: Real,
    pub frontal_area: Real, // m²
}

impl Default for AeroConfig {
    fn default() -> Self {
        Self { drag_coefficient: 0.3, frontal_area: 2.2 }
    }
}

// ============================================
// ----- presets -----
// ============================================

impl Default for SuspensionConfig {
    fn default() -> Self {
        Self { stiffness: 35_000.0, damping: 4_000.0, rest_length: 0.3 }
    }
}

impl Default for TireConfig {
    fn default() -> Self {
        Self {
            radius: 0.33,
            offsets: vec![
                [ 1.3,  0.8, -0.2], // FL
                [ 1.3, -0.8, -0.2], // FR
                [-1.3,  0.8, -0.2], // RL
                [-1.3, -0.8, -0.2], // RR
            ],
            lateral: MagicFormulaCoefficients::LATERAL,
            longitudinal: MagicFormulaCoefficients::LONGITUDINAL,
            pneumatic_trail: DEFAULT_PNEUMATIC_TRAIL,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rpm: 7000.0,
            idle_rpm: 800.0,
            peak_torque: 400.0,
            peak_rpm: 4500.0,
            inertia: 0.3,
            torque_curvature: torque_curvature(),
            min_torque: min_torque(),
            friction_coeff: friction_coeff(),
        }
    }
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            gears: vec![3.5, 2.1, 1.4, 1.0, 0.8],
            final_drive: 3.7,
            reverse_ratio: reverse_ratio(),
            upshift_rpm: upshift_rpm(),
            downshift_rpm: downshift_rpm(),
            shift_cooldown: shift_cooldown(),
            mode: ShiftMode::Automatic,
        }
    }
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self::sedan()
    }
}

impl VehicleConfig {
    /// 1.5 t rear-driven road car.
    pub fn sedan() -> Self {
        Self {
            mass: 1500.0,
            inertia: [600.0, 2500.0, 2800.0],
            suspension: SuspensionConfig::default(),
            tires: TireConfig::default(),
            drivetrain: DrivetrainConfig {
                engine: EngineConfig::default(),
                transmission: TransmissionConfig::default(),
            },
            handling: HandlingConfig::default(),
            aero: AeroConfig::default(),
        }
    }

    /// Heavy, softly sprung, short-geared.
    pub fn truck() -> Self {
        Self {
            mass: 4500.0,
            inertia: [2500.0, 9000.0, 10_000.0],
            suspension: SuspensionConfig { stiffness: 120_000.0, damping: 14_000.0, rest_length: 0.4 },
            tires: TireConfig {
                radius: 0.45,
                offsets: vec![
                    [ 1.9,  1.0, -0.3],
                    [ 1.9, -1.0, -0.3],
                    [-1.9,  1.0, -0.3],
                    [-1.9, -1.0, -0.3],
                ],
                ..TireConfig::default()
            },
            drivetrain: DrivetrainConfig {
                engine: EngineConfig {
                    max_rpm: 4500.0,
                    idle_rpm: 600.0,
                    peak_torque: 1200.0,
                    peak_rpm: 2000.0,
                    inertia: 1.2,
                    ..EngineConfig::default()
                },
                transmission: TransmissionConfig {
                    gears: vec![5.0, 3.2, 2.1, 1.4, 1.0],
                    final_drive: 4.1,
                    upshift_rpm: 3800.0,
                    downshift_rpm: 1500.0,
                    ..TransmissionConfig::default()
                },
            },
            handling: HandlingConfig { max_steer_angle: 0.45, brake_force: 12_000.0, ..HandlingConfig::default() },
            aero: AeroConfig { drag_coefficient: 0.6, frontal_area: 6.0 },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tires.offsets.len() != WHEEL_COUNT {
            return Err(ConfigError::TireCount { expected: WHEEL_COUNT, actual: self.tires.offsets.len() });
        }
        let t = &self.drivetrain.transmission;
        if t.gears.is_empty() {
            return Err(ConfigError::EmptyGearTable);
        }

        finite("mass", self.mass)?;
        for v in self.inertia {
            finite("inertia", v)?;
        }
        finite("suspension.stiffness", self.suspension.stiffness)?;
        finite("suspension.damping", self.suspension.damping)?;
        finite("suspension.restLength", self.suspension.rest_length)?;
        for o in self.tires.offsets.iter().flatten() {
            finite("tires.offsets", *o)?;
        }
        positive("tires.radius", self.tires.radius)?;
        for g in &t.gears {
            finite("transmission.gears", *g)?;
        }
        finite("transmission.finalDrive", t.final_drive)?;
        finite("transmission.reverseRatio", t.reverse_ratio)?;

        let e = &self.drivetrain.engine;
        finite("engine.idleRpm", e.idle_rpm)?;
        finite("engine.maxRpm", e.max_rpm)?;
        if e.idle_rpm >= e.max_rpm {
            return Err(ConfigError::InvalidRpmRange { idle: e.idle_rpm, max: e.max_rpm });
        }
        finite("engine.peakTorque", e.peak_torque)?;
        finite("engine.inertia", e.inertia)?;
        Ok(())
    }
}

/// Simulation-wide settings threaded through at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimConfig {
    pub fixed_timestep: f64,  // s
    pub max_frame_time: f64,  // s, step() clamps to this
    pub air_density: Real,    // kg/m³
    pub angular_damping: Real,// per-tick multiplier
    pub inertia_model: InertiaModel,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_frame_time: 0.25,
            air_density: 1.225,
            angular_damping: 0.999,
            inertia_model: InertiaModel::WorldAligned,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("fixedTimestep", self.fixed_timestep)?;
        positive("maxFrameTime", self.max_frame_time)?;
        finite("airDensity", self.air_density)?;
        finite("angularDamping", self.angular_damping)?;
        Ok(())
    }
}

fn finite(field: &'static str, v: impl Into<f64>) -> Result<(), ConfigError> {
    if v.into().is_finite() { Ok(()) } else { Err(ConfigError::NonFinite { field }) }
}

fn positive(field: &'static str, v: impl Into<f64> + Copy) -> Result<(), ConfigError> {
    finite(field, v)?;
    let v = v.into();
    if v > 0.0 { Ok(()) } else { Err(ConfigError::non_positive(field, v)) }
}
