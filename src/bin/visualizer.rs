use std::{path::PathBuf, time::Instant};

use blue_engine::{primitive_shapes::uv_sphere, Engine, KeyCode, WindowDescriptor};
use clap::Parser;
use color_eyre::Result;
use nbody_live::{
    diagnostics,
    presentation::{display_radius, FrameSync},
    BodyCreator, DirectSummation, RandomBodyCreator, Simulation, SimulationConfig,
};
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(about = "Spawn bodies with N, change the time step with = and -")]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Maximum number of bodies, overrides the configuration.
    #[arg(long)]
    capacity: Option<usize>,
    /// Initial time step, overrides the configuration.
    #[arg(long)]
    time_step: Option<f64>,
    /// Number of bodies spawned at startup.
    #[arg(short, long, default_value_t = 0)]
    bodies: usize,
    /// Threads for the force calculation.
    #[arg(short, long, default_value_t = 1)]
    threads: usize,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_toml_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    if let Some(time_step) = args.time_step {
        config.engine.time_step = time_step;
    }

    let mut sim = Simulation::from_config(&config)?;
    if args.threads > 1 {
        sim = sim.solver(DirectSummation::new().multithreaded(args.threads));
    }

    let mut creator = RandomBodyCreator::new(&config.spawn);
    for body in creator.create_bodies(args.bodies)? {
        sim.add_body(&body);
    }
    sim.start()?;
    info!(capacity = config.capacity, bodies = args.bodies, "simulation started");

    let mut engine = Engine::new_config(WindowDescriptor {
        width: 1920,
        height: 1080,
        title: "N-body simulation",
        ..Default::default()
    })?;

    let mut frame = FrameSync::new();
    let mut last_report = Instant::now();

    engine.update_loop(move |renderer, _, objects, input, _, _| {
        if input.key_pressed(KeyCode::KeyN) {
            match creator.create_body() {
                Ok(body) => {
                    sim.add_body(&body);
                }
                Err(err) => error!(%err, "could not spawn body"),
            }
        }
        for (key, factor) in [(KeyCode::Equal, 2.), (KeyCode::Minus, 0.5)] {
            if input.key_pressed(key) {
                let time_step = sim.time_step();
                if let Err(err) = time_step.set(time_step.get() * factor) {
                    error!(%err, "could not change time step");
                }
            }
        }

        let update = frame.refresh(sim.state());

        for slot in update
            .new_slots
            .clone()
            .chain(update.resized_slots.iter().copied())
        {
            let radius = display_radius(update.bodies[slot].mass()) as f32;
            if let Err(err) = uv_sphere(format!("body{slot}"), (8, 8, radius), renderer, objects) {
                error!(%err, slot, "could not create sphere");
            }
        }

        for (slot, body) in update.bodies.iter().enumerate() {
            if let Some(obj) = objects.get_mut(&format!("body{slot}")) {
                let pos = body.position;
                obj.set_position(pos.x as f32, pos.y as f32, pos.z as f32);
            }
        }

        if last_report.elapsed().as_secs() >= 1 {
            debug!(
                bodies = update.bodies.len(),
                time_step = sim.time_step().get(),
                kinetic_energy = diagnostics::kinetic_energy(update.bodies),
                momentum = ?diagnostics::total_momentum(update.bodies),
                "frame"
            );
            last_report = Instant::now();
        }
    })?;

    Ok(())
}

fn init_tracing() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }
}
