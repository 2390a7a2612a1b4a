use std::cell::Cell;

use approx::assert_relative_eq;

use vehicle_dynamics::config::WHEEL_COUNT;
use vehicle_dynamics::drivetrain::ShiftMode;
use vehicle_dynamics::environment::STANDARD_GRAVITY;
use vehicle_dynamics::math::{Quat, Real, Vec3};
use vehicle_dynamics::{
    ColliderGround, ConfigError, ControlInput, Environment, FlatGround, PhysicsEngine, SimConfig, Vehicle,
    VehicleConfig, WheelId,
};

const TICK: f64 = 1.0 / 60.0;
const REST_Z: Real = 0.725; // sedan on flat ground at 0

fn sedan<E: Environment>(env: E, z: Real) -> PhysicsEngine<Vehicle, E> {
    let mut e = PhysicsEngine::with_config(&VehicleConfig::sedan(), env, SimConfig::default()).expect("sedan");
    e.reset(Vec3::new(0.0, 0.0, z), Quat::identity());
    e
}

fn run<E: Environment>(e: &mut PhysicsEngine<Vehicle, E>, seconds: f64, input: ControlInput) {
    e.apply_input(input);
    let ticks = (seconds / TICK).round() as u32;
    for _ in 0..ticks {
        e.step(TICK);
    }
}

/// Flat ground that can drop away mid-run.
struct Trapdoor {
    open: Cell<bool>,
}

impl Environment for Trapdoor {
    fn gravity(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, -STANDARD_GRAVITY)
    }

    fn ground_height(&self, _x: Real, _y: Real) -> Real {
        if self.open.get() { -1_000.0 } else { 0.0 }
    }

    fn ground_normal(&self, _x: Real, _y: Real) -> Vec3 {
        Vec3::z()
    }
}

#[test]
fn freefall_matches_gravity() {
    let mut e = sedan(FlatGround::default(), 100.0);
    run(&mut e, 1.0, ControlInput::default());

    let s = e.state();
    assert_eq!(e.tick_count(), 60);
    assert_relative_eq!(s.velocity.z, -STANDARD_GRAVITY, epsilon = 0.05);
    assert_relative_eq!(s.position.z, 100.0 - 0.5 * STANDARD_GRAVITY, epsilon = 0.15);
    assert_eq!(s.position.x, 0.0);
    assert_eq!(s.position.y, 0.0);
    assert!(s.wheel_telemetry.iter().all(|w| !w.grounded));
}

#[test]
fn settles_at_static_equilibrium() {
    let mut e = sedan(FlatGround::default(), 1.0);
    run(&mut e, 5.0, ControlInput::default());

    let s = e.state();
    assert!(s.speed() < 0.01, "still moving: {}", s.speed());
    assert!(s.angular_velocity.norm() < 0.01);
    assert_relative_eq!(s.position.z, REST_Z, epsilon = 0.01);

    let share = 1500.0 * STANDARD_GRAVITY / WHEEL_COUNT as Real;
    for w in &s.wheel_telemetry {
        assert!(w.grounded);
        assert_relative_eq!(w.suspension_force, share, max_relative = 0.02);
        assert_eq!(w.skid, 0.0);
    }
}

#[test]
fn parked_vehicle_stays_parked() {
    let mut e = sedan(FlatGround::default(), REST_Z);
    run(&mut e, 3.0, ControlInput::default());
    let parked = e.state();

    for _ in 0..1200 {
        e.step(TICK);
        let s = e.state();
        assert!((s.position - parked.position).norm() < 1e-3);
        assert!(s.speed() < 1e-3);
    }
}

#[test]
fn settles_on_collider_slab() {
    let mut e = sedan(ColliderGround::with_ground_slab(0.25), 1.3);
    run(&mut e, 5.0, ControlInput::default());
    assert_relative_eq!(e.state().position.z, 0.25 + REST_Z, epsilon = 0.02);
}

#[test]
fn frame_pattern_does_not_change_the_result() {
    let drive = ControlInput::new(0.8, 0.0, 0.3);

    let mut a = sedan(FlatGround::default(), REST_Z);
    let mut b = sedan(FlatGround::default(), REST_Z);
    let mut c = sedan(FlatGround::default(), REST_Z);
    for e in [&mut a, &mut b, &mut c] {
        e.apply_input(drive);
    }

    for _ in 0..10 {
        a.step(TICK);
    }
    for _ in 0..5 {
        b.step(2.0 * TICK);
    }
    for _ in 0..20 {
        c.step(0.5 * TICK);
    }

    assert_eq!(a.tick_count(), 10);
    assert_eq!(a.state(), b.state());
    assert_eq!(a.state(), c.state());
}

#[test]
fn throttle_moves_forward() {
    let mut e = sedan(FlatGround::default(), REST_Z);
    run(&mut e, 1.0, ControlInput::default());
    run(&mut e, 1.0, ControlInput::new(1.0, 0.0, 0.0));

    let s = e.state();
    assert!(s.velocity.x > 0.1, "forward speed {}", s.velocity.x);
    assert!(s.engine_rpm > 800.0);
    assert!(s.wheel(WheelId::RL).wheel_speed > 0.0);
    assert!(s.engine_torque > 0.0);
    assert_eq!(s.engine_torque, e.vehicle().engine().torque_curve(s.engine_rpm));
}

#[test]
fn left_steer_yaws_left() {
    let mut e = sedan(FlatGround::default(), REST_Z);
    run(&mut e, 3.0, ControlInput::new(1.0, 0.0, 0.0));
    assert!(e.state().velocity.x > 5.0);

    run(&mut e, 0.5, ControlInput::new(0.0, 0.0, 1.0));
    let s = e.state();
    assert!(s.angular_velocity.z > 0.0, "yaw rate {}", s.angular_velocity.z);
    assert!(s.wheel(WheelId::FL).steer_angle > 0.0);
    assert_eq!(s.wheel(WheelId::RL).steer_angle, 0.0);
}

#[test]
fn braking_stops_without_reversing() {
    let mut e = sedan(FlatGround::default(), REST_Z);
    run(&mut e, 3.0, ControlInput::new(1.0, 0.0, 0.0));
    let before = e.state().velocity.x;
    assert!(before > 5.0);

    e.apply_input(ControlInput::new(0.0, 1.0, 0.0));
    for _ in 0..240 {
        e.step(TICK);
        assert!(e.state().velocity.x > -0.05);
    }
    assert!(e.state().speed() < 0.5);
}

#[test]
fn airborne_wheels_produce_nothing() {
    let mut e = sedan(Trapdoor { open: Cell::new(false) }, REST_Z);
    run(&mut e, 2.0, ControlInput::new(1.0, 0.0, 0.2));
    let before = e.state();
    assert!(before.wheel(WheelId::RL).wheel_speed > 0.0);

    e.environment().open.set(true);
    run(&mut e, TICK, ControlInput::new(1.0, 1.0, 1.0));

    let after = e.state();
    for id in WheelId::ALL {
        let w = after.wheel(id);
        assert!(!w.grounded);
        assert_eq!(w.suspension_force, 0.0);
        assert_eq!(w.tractive_force, 0.0);
        assert_eq!(w.lateral_force, 0.0);
        assert_eq!(w.skid, 0.0);
        assert_eq!(w.wheel_speed, before.wheel(id).wheel_speed);
    }
    assert!(after.skids.iter().all(|s| *s == 0.0));
}

#[test]
fn manual_gearbox_waits_for_driver() {
    let mut cfg = VehicleConfig::sedan();
    cfg.drivetrain.transmission.mode = ShiftMode::Manual;
    let mut e = PhysicsEngine::with_config(&cfg, FlatGround::default(), SimConfig::default()).expect("manual");
    e.reset(Vec3::new(0.0, 0.0, REST_Z), Quat::identity());

    run(&mut e, 4.0, ControlInput::new(1.0, 0.0, 0.0));
    assert_eq!(e.state().gear, 1);

    let change = e.shift_up().expect("upshift");
    assert_eq!((change.from, change.to), (1, 2));
    // cooldown blocks an immediate second shift
    assert_eq!(e.shift_up(), None);

    assert!(e.set_gear(-1).is_some());
    run(&mut e, TICK, ControlInput::default());
    assert_eq!(e.state().gear, -1);
}

#[test]
fn automatic_gearbox_upshifts_under_load() {
    let mut e = sedan(FlatGround::default(), REST_Z);
    run(&mut e, 8.0, ControlInput::new(1.0, 0.0, 0.0));
    assert!(e.state().gear >= 2, "still in gear {}", e.state().gear);
}

#[test]
fn three_tires_is_a_config_error() {
    let mut cfg = VehicleConfig::sedan();
    cfg.tires.offsets.pop();
    let err = PhysicsEngine::with_config(&cfg, FlatGround::default(), SimConfig::default()).err();
    assert_eq!(err, Some(ConfigError::TireCount { expected: 4, actual: 3 }));
}
