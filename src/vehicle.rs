// ==============================================================================
// vehicle.rs — FOUR-CORNER VEHICLE ORCHESTRATOR
// ------------------------------------------------------------------------------
// One call to update(dt) runs, in order:
//
// 1) Engine <-> wheel coupling: mean rear wheel speed -> rpm through the current
//    ratio (rigid, no clutch slip), floored at idle. Neutral: engine free-revs.
// 2) Automatic shift check, engine update, drive torque per driven wheel
//    = engine_torque · ratio / 2.
// 3) Per corner (FL, FR, RL, RR):
//    a. mount = x + R·offset, hub velocity = v + ω × (R·offset),
//       compression = rest − (mount height above ground − radius)
//    b. suspension force (clamped ≥ 0) along body up, at the mount
//    c. no load -> airborne: no tire force, no skid, wheel speed held
//    d. wheel basis (front corners steered), slip angle, tractive force from
//       drive torque / radius minus brake, lateral force from the tire model
//    e. combined-slip clamp, f. skid estimate,
//    g. horizontal force at the contact point (mount − up · radius)
//    h. wheel speed = v_long / radius
// 4) Gravity and quadratic drag through the center of mass.
// 5) body.integrate(dt)
//
// The tire model's slip-ratio branch is never driven here: traction and
// braking come straight from torque / brake force.
// ==============================================================================

use tracing::{info, warn};

use crate::config::{AeroConfig, HandlingConfig, SimConfig, VehicleConfig};
use crate::drivetrain::{Engine, GearChange, Transmission};
use crate::environment::Environment;
use crate::error::ConfigError;
use crate::math::{Quat, RAD_PER_SEC_TO_RPM, Real, Vec3, rotate, sign, vec3};
use crate::rigid_body::RigidBody;
use crate::state::{ControlInput, SimulationState, WheelTelemetry, WheelTransform};
use crate::suspension::Suspension;
use crate::tire::grip::{combined_clamp, skid_intensity};
use crate::tire::kinematics::{point_velocity, slip_angle, slip_components, wheel_basis_world};
use crate::tire::{MagicFormula, Tire, WheelId};

/// Rear axle.
const DRIVEN_WHEELS: Real = 2.0;

/// What the fixed-step loop needs from a vehicle.
pub trait VehicleModel {
    fn update(&mut self, dt: Real, input: &ControlInput, env: &dyn Environment);
    fn state(&self, timestamp: f64) -> SimulationState;
}

#[derive(Debug, Clone)]
struct Corner {
    id: WheelId,
    suspension: Suspension,
    tire: Tire,
    transform: WheelTransform,
    telemetry: WheelTelemetry,
}

/// Per-tick values shared by all four corners.
struct TickContext<'a> {
    dt: Real,
    steering: Real,
    brake: Real,
    drive_torque: Real, // N·m per driven wheel
    corner_mass: Real,  // kg, share of the body each corner has to stop
    handling: &'a HandlingConfig,
    tire_model: &'a MagicFormula,
}

pub struct Vehicle {
    body: RigidBody,
    corners: [Corner; 4],
    engine: Engine,
    transmission: Transmission,
    tire_model: MagicFormula,
    handling: HandlingConfig,
    aero: AeroConfig,
    air_density: Real,
}

impl Vehicle {
    pub fn new(config: &VehicleConfig, sim: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        sim.validate()?;

        if config.mass <= 0.0 {
            warn!(mass = config.mass, "non-positive mass, chassis will be immovable");
        }
        if config.inertia.iter().any(|i| *i <= 0.0) {
            warn!(inertia = ?config.inertia, "non-positive inertia component, axis locked");
        }

        let body = RigidBody::new(config.mass, vec3(config.inertia), sim.angular_damping, sim.inertia_model);

        let corners = WheelId::ALL.map(|id| Corner {
            id,
            suspension: Suspension::new(&config.suspension),
            tire: Tire::new(&config.tires, config.tires.offsets[id.index()]),
            transform: WheelTransform::default(),
            telemetry: WheelTelemetry::idle(id),
        });

        let mut vehicle = Self {
            body,
            corners,
            engine: Engine::new(&config.drivetrain.engine),
            transmission: Transmission::new(&config.drivetrain.transmission),
            tire_model: MagicFormula {
                lateral: config.tires.lateral,
                longitudinal: config.tires.longitudinal,
                pneumatic_trail: config.tires.pneumatic_trail,
            },
            handling: config.handling,
            aero: config.aero,
            air_density: sim.air_density,
        };
        vehicle.rest_transforms();

        info!(
            mass = config.mass,
            gears = config.drivetrain.transmission.gears.len(),
            "vehicle built"
        );
        Ok(vehicle)
    }

    pub fn body(&self) -> &RigidBody { &self.body }
    pub fn engine(&self) -> &Engine { &self.engine }
    pub fn transmission(&self) -> &Transmission { &self.transmission }
    pub fn tire_model(&self) -> &MagicFormula { &self.tire_model }

    pub fn telemetry(&self, id: WheelId) -> &WheelTelemetry {
        &self.corners[id.index()].telemetry
    }

    pub fn shift_up(&mut self) -> Option<GearChange> { self.transmission.shift_up() }
    pub fn shift_down(&mut self) -> Option<GearChange> { self.transmission.shift_down() }
    pub fn set_gear(&mut self, gear: i32) -> Option<GearChange> { self.transmission.set_gear(gear) }

    /// Teleport to a pose at rest; drivetrain back to idle in first gear.
    pub fn reset(&mut self, position: Vec3, orientation: Quat) {
        self.body.reset(position, orientation);
        for c in self.corners.iter_mut() {
            c.suspension.reset();
            c.tire.reset();
            c.telemetry = WheelTelemetry::idle(c.id);
        }
        self.engine.reset();
        self.transmission.reset();
        self.rest_transforms();
        info!(x = position.x, y = position.y, z = position.z, "vehicle reset");
    }

    /// Wheels hanging at full rest length under their mounts.
    fn rest_transforms(&mut self) {
        let rot = self.body.orientation;
        let up = rotate(&rot, Vec3::z());
        for c in self.corners.iter_mut() {
            let mount = self.body.position + rotate(&rot, c.tire.offset);
            c.transform = WheelTransform {
                position: mount - up * c.suspension.rest_length,
                orientation: rot,
            };
        }
    }

    fn couple_engine_to_wheels(&mut self) {
        let ratio = self.transmission.ratio();
        if ratio == 0.0 {
            return; // neutral: engine runs on its own dynamics
        }
        let rear: Real = self
            .corners
            .iter()
            .filter(|c| c.id.is_rear())
            .map(|c| c.tire.wheel_speed())
            .sum::<Real>()
            / DRIVEN_WHEELS;
        self.engine.set_rpm(rear * ratio * RAD_PER_SEC_TO_RPM);
    }

    fn apply_body_forces(&mut self, env: &dyn Environment) {
        let mass = self.body.mass().max(0.0);
        self.body.add_force(env.gravity() * mass);

        let v = self.body.velocity;
        let speed = v.norm();
        if speed > 1e-6 {
            let drag = 0.5 * self.air_density * self.aero.drag_coefficient * self.aero.frontal_area * speed * speed;
            self.body.add_force(-v / speed * drag);
        }
    }
}

impl VehicleModel for Vehicle {
    fn update(&mut self, dt: Real, input: &ControlInput, env: &dyn Environment) {
        let input = input.clamped();

        // ----------------------------------------------------------------
        // 1) + 2) drivetrain
        // ----------------------------------------------------------------
        self.couple_engine_to_wheels();
        self.transmission.update_automatic(self.engine.rpm(), input.throttle, dt);
        let ratio = self.transmission.ratio();
        let engine_torque = self.engine.update(dt, input.throttle, 0.0);
        let drive_torque = engine_torque * ratio / DRIVEN_WHEELS;

        // ----------------------------------------------------------------
        // 3) corners
        // ----------------------------------------------------------------
        let ctx = TickContext {
            dt,
            steering: input.steering,
            brake: input.brake,
            drive_torque,
            corner_mass: self.body.mass().max(0.0) / self.corners.len() as Real,
            handling: &self.handling,
            tire_model: &self.tire_model,
        };
        for corner in self.corners.iter_mut() {
            step_corner(corner, &mut self.body, &ctx, env);
        }

        // ----------------------------------------------------------------
        // 4) + 5) body
        // ----------------------------------------------------------------
        self.apply_body_forces(env);
        self.body.integrate(dt);
    }

    fn state(&self, timestamp: f64) -> SimulationState {
        let b = &self.body;
        SimulationState {
            timestamp,
            position: b.position,
            velocity: b.velocity,
            orientation: b.orientation,
            angular_velocity: b.angular_velocity,
            wheels: std::array::from_fn(|i| self.corners[i].transform),
            skids: std::array::from_fn(|i| self.corners[i].telemetry.skid),
            engine_rpm: self.engine.rpm(),
            gear: self.transmission.current_gear(),
            engine_torque: self.engine.torque_curve(self.engine.rpm()),
            wheel_telemetry: std::array::from_fn(|i| self.corners[i].telemetry),
        }
    }
}

fn step_corner(corner: &mut Corner, body: &mut RigidBody, ctx: &TickContext<'_>, env: &dyn Environment) {
    let h = ctx.handling;
    let rot = body.orientation;
    let up = rotate(&rot, Vec3::z());
    let radius = corner.tire.radius;

    // a) kinematics
    let offset_world = rotate(&rot, corner.tire.offset);
    let mount = body.position + offset_world;
    let hub_vel = point_velocity(body.velocity, body.angular_velocity, offset_world);

    let ground = env.ground_height(mount.x, mount.y);
    let _ground_normal = env.ground_normal(mount.x, mount.y); // reserved for slope-aware grip
    let compression = corner.suspension.rest_length - ((mount.z - ground) - radius);

    // b) suspension
    let load = corner.suspension.update(compression, ctx.dt).max(0.0);
    let steer = if corner.id.is_front() { ctx.steering * h.max_steer_angle } else { 0.0 };

    let mut t = WheelTelemetry {
        compression,
        suspension_force: load,
        steer_angle: steer,
        ..WheelTelemetry::idle(corner.id)
    };

    if load > 0.0 {
        t.grounded = true;
        body.add_force_at_point(up * load, mount);

        // d) slip + forces
        let (forward, left) = wheel_basis_world(&rot, steer);
        let (v_long, v_lat) = slip_components(hub_vel, forward, left);
        let alpha = slip_angle(v_long, v_lat, h.slip_deadband);

        let mut tractive = if corner.id.is_rear() { ctx.drive_torque / radius } else { 0.0 };
        if ctx.brake > 0.0 {
            // brake · brake_force, capped at what stops this corner's share within
            // the tick so a wheel at standstill never pushes the car backwards
            let stop = if ctx.dt > 0.0 { v_long.abs() * ctx.corner_mass / ctx.dt } else { 0.0 };
            let brake = (ctx.brake * h.brake_force).min(stop);
            tractive -= brake * sign(v_long);
        }

        let tire = ctx.tire_model.calculate(load, alpha, 0.0);

        // e) + f)
        let clamped = combined_clamp(tractive, tire.lateral, load, h.friction_cap);
        let skid = skid_intensity(clamped.excess, alpha, h.skid_slip_threshold, h.skid_slip_gain);

        // g)
        let contact = mount - up * radius;
        body.add_force_at_point(forward * clamped.tractive + left * clamped.lateral, contact);

        // h)
        corner.tire.roll(v_long);

        t.slip_angle = alpha;
        t.tractive_force = clamped.tractive;
        t.lateral_force = clamped.lateral;
        t.aligning_moment = tire.aligning_moment;
        t.skid = skid;
    }

    corner.tire.advance_spin(ctx.dt);
    t.wheel_speed = corner.tire.wheel_speed();

    // hub hangs at rest length when airborne, never above the mount
    let travel = (corner.suspension.rest_length - compression.max(0.0)).max(0.0);
    let steer_rot = Quat::from_axis_angle(&Vec3::z_axis(), steer);
    let spin_rot = Quat::from_axis_angle(&Vec3::y_axis(), corner.tire.spin_angle());
    corner.transform = WheelTransform {
        position: mount - up * travel,
        orientation: rot * steer_rot * spin_rot,
    };
    corner.telemetry = t;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::FlatGround;
    use approx::assert_relative_eq;

    const DT: Real = 1.0 / 60.0;

    fn vehicle() -> Vehicle {
        Vehicle::new(&VehicleConfig::sedan(), &SimConfig::default()).expect("valid preset")
    }

    #[test]
    fn rejects_three_wheels() {
        let mut cfg = VehicleConfig::sedan();
        cfg.tires.offsets.truncate(3);
        let err = Vehicle::new(&cfg, &SimConfig::default()).err();
        assert_eq!(err, Some(ConfigError::TireCount { expected: 4, actual: 3 }));
    }

    #[test]
    fn airborne_corner_is_inert() {
        let mut v = vehicle();
        v.reset(Vec3::new(0.0, 0.0, 50.0), Quat::identity());
        for c in v.corners.iter_mut() {
            c.tire.roll(c.tire.radius * 7.0);
        }
        v.update(DT, &ControlInput::new(1.0, 0.0, 1.0), &FlatGround::default());

        for c in &v.corners {
            assert!(!c.telemetry.grounded);
            assert_eq!(c.telemetry.suspension_force, 0.0);
            assert_eq!(c.telemetry.tractive_force, 0.0);
            assert_eq!(c.telemetry.lateral_force, 0.0);
            assert_eq!(c.telemetry.skid, 0.0);
            assert_relative_eq!(c.tire.wheel_speed(), 7.0, epsilon = 1e-5);
        }
        // only gravity and drag acted: no horizontal motion, no spin
        assert_eq!(v.body.velocity.x, 0.0);
        assert_eq!(v.body.velocity.y, 0.0);
        assert_eq!(v.body.angular_velocity, Vec3::zeros());
    }

    #[test]
    fn neutral_lets_engine_free_rev() {
        let mut v = vehicle();
        v.reset(Vec3::new(0.0, 0.0, 50.0), Quat::identity());
        v.set_gear(0);
        let idle = v.engine().rpm();
        for _ in 0..10 {
            v.update(DT, &ControlInput::new(1.0, 0.0, 0.0), &FlatGround::default());
        }
        assert!(v.engine().rpm() > idle);
        assert_eq!(v.transmission().current_gear(), 0);
    }

    #[test]
    fn in_gear_engine_follows_wheels() {
        let mut v = vehicle();
        v.reset(Vec3::new(0.0, 0.0, 50.0), Quat::identity());
        let w = 30.0; // rad/s
        for c in v.corners.iter_mut() {
            c.tire.roll(c.tire.radius * w);
        }
        v.couple_engine_to_wheels();
        let expected = w * v.transmission().ratio() * RAD_PER_SEC_TO_RPM;
        assert_relative_eq!(v.engine().rpm(), expected, epsilon = 1.0);
    }

    #[test]
    fn reset_restores_idle_state() {
        let mut v = vehicle();
        v.reset(Vec3::new(0.0, 0.0, 1.0), Quat::identity());
        for _ in 0..120 {
            v.update(DT, &ControlInput::new(1.0, 0.0, 0.3), &FlatGround::default());
        }
        v.reset(Vec3::new(5.0, 5.0, 2.0), Quat::identity());
        let s = v.state(0.0);
        assert_eq!(s.position, Vec3::new(5.0, 5.0, 2.0));
        assert_eq!(s.velocity, Vec3::zeros());
        assert_eq!(s.gear, 1);
        assert_eq!(s.engine_rpm, v.engine().idle_rpm);
        assert!(s.skids.iter().all(|k| *k == 0.0));
        assert_relative_eq!(s.wheels[0].position.z, 2.0 - 0.2 - 0.3, epsilon = 1e-5);
    }

    #[test]
    fn grounded_corner_pushes_up_at_mount() {
        let mut v = vehicle();
        // mounts at z = 0.4 -> compression = 0.3 − (0.4 − 0.33) = 0.23
        v.reset(Vec3::new(0.0, 0.0, 0.6), Quat::identity());
        v.update(DT, &ControlInput::default(), &FlatGround::default());
        for c in &v.corners {
            assert!(c.telemetry.grounded);
            assert_relative_eq!(c.telemetry.compression, 0.23, epsilon = 1e-4);
        }
        assert!(v.body.velocity.z > 0.0, "springs beat gravity at this compression");
    }

    #[test]
    fn drag_opposes_motion_without_torque() {
        let mut v = vehicle();
        v.reset(Vec3::new(0.0, 0.0, 50.0), Quat::identity());
        v.body.velocity = Vec3::new(30.0, 0.0, 0.0);
        v.update(DT, &ControlInput::default(), &FlatGround::default());

        // 0.5 · ρ · Cd · A · v² / m · dt
        let expected = -0.5 * 1.225 * 0.3 * 2.2 * 900.0 / 1500.0 * DT;
        let dvx = v.body.velocity.x - 30.0;
        assert!(dvx < 0.0);
        assert_relative_eq!(dvx, expected, epsilon = 1e-5);
        assert_eq!(v.body.velocity.y, 0.0);
        assert_eq!(v.body.angular_velocity, Vec3::zeros());
    }

    #[test]
    fn applied_tire_force_stays_inside_friction_circle() {
        let mut cfg = VehicleConfig::sedan();
        cfg.handling.friction_cap = 0.5; // low enough that full lock saturates the fronts
        let mut v = Vehicle::new(&cfg, &SimConfig::default()).expect("valid config");
        v.reset(Vec3::new(0.0, 0.0, 0.7), Quat::identity());
        v.body.velocity = Vec3::new(30.0, 0.0, 0.0);

        let handling = cfg.handling;
        let tire_model = v.tire_model;
        let ctx = TickContext {
            dt: DT,
            steering: 1.0,
            brake: 0.0,
            drive_torque: 2000.0,
            corner_mass: 375.0,
            handling: &handling,
            tire_model: &tire_model,
        };

        let env = FlatGround::default();
        for corner in v.corners.iter_mut() {
            let mut body = v.body.clone();
            body.clear_accumulators();
            step_corner(corner, &mut body, &ctx, &env);

            let t = corner.telemetry;
            assert!(t.grounded);
            let limit = handling.friction_cap * t.suspension_force;

            // body is level, so everything horizontal came from the tire
            let f = body.accumulated_force();
            let applied = f.x.hypot(f.y);
            assert!(applied <= limit * 1.0001, "{}: {applied} > {limit}", corner.id);
            assert!(t.tractive_force.hypot(t.lateral_force) <= limit * 1.0001);
            assert_relative_eq!(applied, t.tractive_force.hypot(t.lateral_force), max_relative = 1e-4);

            if corner.id.is_front() {
                assert_relative_eq!(applied, limit, max_relative = 1e-3);
                assert!(t.skid > 0.0);
            }
        }
    }
}
