//! Real-time N-body gravity.
//!
//! A [`SimulationState`] holds a fixed number of bodies in one flat buffer
//! that the presentation layer appends to and reads snapshots from, while an
//! [`IntegrationEngine`] on its own thread advances the bodies with direct
//! summation and explicit Euler steps. Both sides only share the table and
//! the [`TimeStep`] control.
//!
//! ```no_run
//! use nalgebra::Vector3;
//! use nbody_live::{Body, EngineConfig, Simulation};
//!
//! # fn main() -> nbody_live::Result<()> {
//! let mut sim = Simulation::new(100, EngineConfig::default())?;
//! sim.add_body(&Body::at_rest(1e9, Vector3::zeros())?);
//! sim.start()?;
//!
//! for body in sim.snapshot() {
//!     println!("{:?}", body.position);
//! }
//!
//! sim.time_step().set(0.01)?;
//! let stats = sim.stop()?;
//! println!("{} ticks", stats.ticks);
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod config;
#[cfg(feature = "randomization")]
pub mod creator;
pub mod diagnostics;
pub mod direct_summation;
pub mod engine;
mod error;
pub mod gravity;
pub mod integrator;
pub mod presentation;
pub mod simulation;
pub mod state;

pub use body::Body;
pub use config::{EngineConfig, SimulationConfig, SpawnConfig, TimeStep};
#[cfg(feature = "randomization")]
pub use creator::{BodyCreator, RandomBodyCreator};
pub use direct_summation::{DirectSummation, Execution};
pub use engine::{EngineHandle, EngineStats, IntegrationEngine, StopToken};
pub use error::{Error, Result};
pub use presentation::FrameSync;
pub use simulation::Simulation;
pub use state::SimulationState;

#[cfg(test)]
pub(crate) fn random_bodies(n: usize, seed: u64) -> Vec<Body> {
    use nalgebra::Vector3;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let mass = rng.gen_range(1.0..100.0);
            let position = Vector3::from_fn(|_, _| rng.gen_range(-10.0..10.0));
            let velocity = Vector3::from_fn(|_, _| rng.gen_range(-1.0..1.0));
            Body::new(mass, position, velocity).unwrap()
        })
        .collect()
}
