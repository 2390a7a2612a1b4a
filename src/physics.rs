// ==============================================================================
// physics.rs — FIXED-TIMESTEP DRIVER
// ------------------------------------------------------------------------------
// The host calls step(frame_dt) once per rendered frame, with whatever time
// actually elapsed. Internally:
//
//     frame_dt     = min(frame_dt, max_frame_time)     (spiral-of-death guard)
//     accumulator += frame_dt
//     while accumulator >= fixed_timestep:
//         vehicle.update(fixed_timestep, input, environment)
//         accumulator -= fixed_timestep
//         latest       = vehicle.state(ticks · fixed_timestep)
//
// The accumulator and the clock stay in f64; only the per-tick dt handed to
// the vehicle is narrowed to Real. Same input history + same frame_dt sequence
// gives bit-identical states.
// ==============================================================================

use tracing::{debug, info};

use crate::config::{SimConfig, VehicleConfig};
use crate::drivetrain::GearChange;
use crate::environment::Environment;
use crate::error::ConfigError;
use crate::math::{Quat, Real, Vec3};
use crate::state::{ControlInput, SimulationState};
use crate::vehicle::{Vehicle, VehicleModel};

pub struct PhysicsEngine<M: VehicleModel, E: Environment> {
    sim: SimConfig,
    vehicle: M,
    environment: E,
    input: ControlInput,

    accumulator: f64, // s, always < fixed_timestep between calls
    ticks: u64,
    latest: SimulationState,
}

impl<M: VehicleModel, E: Environment> PhysicsEngine<M, E> {
    pub fn new(vehicle: M, environment: E, sim: SimConfig) -> Result<Self, ConfigError> {
        sim.validate()?;
        let latest = vehicle.state(0.0);
        info!(hz = 1.0 / sim.fixed_timestep, max_frame = sim.max_frame_time, "physics engine ready");
        Ok(Self {
            sim,
            vehicle,
            environment,
            input: ControlInput::default(),
            accumulator: 0.0,
            ticks: 0,
            latest,
        })
    }

    /// Advances by however many whole fixed ticks fit into the accumulated time.
    /// Returns the number of ticks run.
    pub fn step(&mut self, frame_dt: f64) -> u32 {
        if !(frame_dt > 0.0) {
            return 0;
        }
        let frame_dt = if frame_dt > self.sim.max_frame_time {
            debug!(frame_dt, clamp = self.sim.max_frame_time, "frame time clamped");
            self.sim.max_frame_time
        } else {
            frame_dt
        };

        let fixed = self.sim.fixed_timestep;
        let tick_dt = fixed as Real;
        self.accumulator += frame_dt;

        let mut ran = 0;
        while self.accumulator >= fixed {
            self.vehicle.update(tick_dt, &self.input, &self.environment);
            self.accumulator -= fixed;
            self.ticks += 1;
            ran += 1;
            self.latest = self.vehicle.state(self.simulated_time());
        }
        ran
    }

    /// Replaces the control slot; takes effect on the next tick.
    pub fn apply_input(&mut self, input: ControlInput) {
        self.input = input.clamped();
    }

    pub fn input(&self) -> ControlInput { self.input }

    /// Snapshot from the most recent tick.
    pub fn state(&self) -> SimulationState {
        self.latest.clone()
    }

    pub fn latest(&self) -> &SimulationState { &self.latest }

    /// Fraction of a tick left in the accumulator, for render interpolation.
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.sim.fixed_timestep
    }

    pub fn tick_count(&self) -> u64 { self.ticks }

    pub fn simulated_time(&self) -> f64 {
        self.ticks as f64 * self.sim.fixed_timestep
    }

    pub fn sim_config(&self) -> &SimConfig { &self.sim }
    pub fn vehicle(&self) -> &M { &self.vehicle }
    pub fn vehicle_mut(&mut self) -> &mut M { &mut self.vehicle }
    pub fn environment(&self) -> &E { &self.environment }
    pub fn environment_mut(&mut self) -> &mut E { &mut self.environment }

    /// Clock, accumulator and control slot back to zero. Vehicle untouched.
    pub fn reset_clock(&mut self) {
        self.accumulator = 0.0;
        self.ticks = 0;
        self.input = ControlInput::default();
        self.latest = self.vehicle.state(0.0);
    }
}

impl<E: Environment> PhysicsEngine<Vehicle, E> {
    pub fn with_config(config: &VehicleConfig, environment: E, sim: SimConfig) -> Result<Self, ConfigError> {
        let vehicle = Vehicle::new(config, &sim)?;
        Self::new(vehicle, environment, sim)
    }

    /// Full reset: vehicle at rest at the given pose, clock back to zero.
    pub fn reset(&mut self, position: Vec3, orientation: Quat) {
        self.vehicle.reset(position, orientation);
        self.reset_clock();
    }

    pub fn shift_up(&mut self) -> Option<GearChange> {
        self.vehicle.shift_up()
    }

    pub fn shift_down(&mut self) -> Option<GearChange> {
        self.vehicle.shift_down()
    }

    pub fn set_gear(&mut self, gear: i32) -> Option<GearChange> {
        self.vehicle.set_gear(gear)
    }
}
