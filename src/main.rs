// Headless demo: drives the sedan over a collider course with a scripted
// driver and streams one JSON snapshot per line to stdout.

use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{Duration, interval};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vehicle_dynamics::math::{Quat, Vec3};
use vehicle_dynamics::{
    ColliderGround, ControlInput, JsonLinesRenderer, PhysicsEngine, Renderer, SimConfig, VehicleConfig,
};

#[derive(Parser, Debug)]
#[command(name = "vehicle-dynamics", about = "Scripted vehicle physics run, JSON lines on stdout")]
struct Args {
    /// Simulated seconds to run
    #[arg(long, default_value_t = 20.0)]
    seconds: f64,

    /// Vehicle config as JSON (defaults to the built-in sedan)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for frame-time jitter
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Emit every Nth frame
    #[arg(long, default_value_t = 6)]
    every: u32,

    /// Don't sleep between frames
    #[arg(long)]
    fast: bool,
}

/// Throttle up, steer into a lane change, brake, coast.
fn driver(t: f64) -> ControlInput {
    match t {
        t if t < 6.0 => ControlInput::new(1.0, 0.0, 0.0),
        t if t < 8.0 => ControlInput::new(0.6, 0.0, 0.4),
        t if t < 10.0 => ControlInput::new(0.6, 0.0, -0.4),
        t if t < 13.0 => ControlInput::new(0.0, 0.8, 0.0),
        _ => ControlInput::new(0.3, 0.0, 0.0),
    }
}

fn course() -> ColliderGround {
    let mut ground = ColliderGround::with_ground_slab(0.0);
    ground
        .add_box([60.0, 0.0, 0.0], [10.0, 6.0, 0.6], [0.0, -0.08, 0.0]) // gentle ramp
        .add_box([90.0, 8.0, 0.1], [5.0, 5.0, 0.1], [0.0, 0.0, 0.0]); // curb platform
    ground
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let vehicle_cfg = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<VehicleConfig>(&raw).with_context(|| format!("parsing {}", path.display()))?
        }
        None => VehicleConfig::sedan(),
    };

    let sim = SimConfig::default();
    let mut engine = PhysicsEngine::with_config(&vehicle_cfg, course(), sim)?;
    engine.reset(Vec3::new(0.0, 0.0, 0.8), Quat::identity());

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut renderer = JsonLinesRenderer::new(BufWriter::new(io::stdout().lock()));
    let mut ticker = interval(Duration::from_millis(16));

    info!(seconds = args.seconds, seed = args.seed, "demo start");

    let mut frame: u64 = 0;
    while engine.simulated_time() < args.seconds {
        if !args.fast {
            ticker.tick().await;
        }

        // uneven host frames: 12..22 ms
        let frame_dt: f64 = rng.gen_range(0.012..0.022);
        engine.apply_input(driver(engine.simulated_time()));
        engine.step(frame_dt);

        frame += 1;
        if frame % u64::from(args.every.max(1)) == 0 {
            renderer.render(engine.latest());
        }
    }

    let s = engine.state();
    info!(
        ticks = engine.tick_count(),
        x = s.position.x,
        y = s.position.y,
        speed = s.speed(),
        gear = s.gear,
        lines = renderer.written(),
        "demo done"
    );
    Ok(())
}
