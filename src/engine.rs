//! The integration loop.
//!
//! [`IntegrationEngine::spawn`] moves the engine onto its own thread where it
//! advances the shared table until the [`StopToken`] is triggered. Every tick
//! reads the active bodies once; bodies appended during a tick are picked up
//! by the next one.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use nalgebra::Vector3;
use tracing::{info, trace};

use crate::{
    body::Body,
    config::{EngineConfig, TimeStep},
    direct_summation::DirectSummation,
    gravity::ForceParams,
    integrator,
    state::SimulationState,
    Error, Result,
};

/// Cooperative stop signal, checked once per tick.
#[derive(Clone, Debug, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What an engine did until it was stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineStats {
    pub ticks: u64,
    pub elapsed: Duration,
}

impl EngineStats {
    #[must_use]
    pub fn ticks_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0. {
            self.ticks as f64 / secs
        } else {
            0.
        }
    }
}

/// Advances the bodies of a [`SimulationState`] with direct summation and
/// explicit Euler steps.
#[derive(Debug)]
pub struct IntegrationEngine {
    state: Arc<SimulationState>,
    time_step: TimeStep,
    params: ForceParams,
    solver: DirectSummation,
    bodies: Vec<Body>,
    epochs: Vec<u64>,
    forces: Vec<Vector3<f64>>,
}

impl IntegrationEngine {
    pub fn new(
        state: Arc<SimulationState>,
        time_step: TimeStep,
        config: &EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        let capacity = state.capacity();
        Ok(Self {
            state,
            time_step,
            params: ForceParams::from(config),
            solver: DirectSummation::new(),
            bodies: Vec::with_capacity(capacity),
            epochs: Vec::with_capacity(capacity),
            forces: Vec::with_capacity(capacity),
        })
    }

    #[must_use]
    pub fn solver(mut self, solver: DirectSummation) -> Self {
        self.solver = solver;
        self
    }

    #[must_use]
    pub fn multithreaded(mut self, num_threads: usize) -> Self {
        self.solver = self.solver.multithreaded(num_threads);
        self
    }

    #[cfg(feature = "rayon")]
    #[must_use]
    pub fn rayon_iter(mut self) -> Self {
        self.solver = self.solver.rayon_iter();
        self
    }

    /// Advance all active bodies by one time step.
    ///
    /// Returns the number of bodies advanced.
    pub fn tick(&mut self) -> usize {
        self.state.read_with_epochs(&mut self.bodies, &mut self.epochs);
        let n = self.bodies.len();
        let time_step = self.time_step.get();

        self.forces.resize(n, Vector3::zeros());
        self.solver.calculate_forces(&self.bodies, &mut self.forces, &self.params);
        integrator::euler_step(&mut self.bodies, &self.forces, time_step);

        for (slot, (body, &epoch)) in self.bodies.iter().zip(&self.epochs).enumerate() {
            if !self.state.store_motion(slot, epoch, body) {
                trace!(slot, "slot replaced during tick, dropping its update");
            }
        }
        self.forces.fill(Vector3::zeros());

        trace!(bodies = n, time_step, "tick");
        n
    }

    /// Tick until `stop` is requested.
    pub fn run(&mut self, stop: &StopToken) -> EngineStats {
        info!(
            capacity = self.state.capacity(),
            execution = ?self.solver.execution(),
            "integration engine started"
        );

        let start = Instant::now();
        let mut ticks = 0;
        while !stop.is_stop_requested() {
            if self.tick() < 2 {
                // nothing interacts, don't hog the core
                thread::yield_now();
            }
            ticks += 1;
        }

        let stats = EngineStats {
            ticks,
            elapsed: start.elapsed(),
        };
        info!(
            ticks,
            elapsed = ?stats.elapsed,
            ticks_per_second = stats.ticks_per_second(),
            "integration engine stopped"
        );
        stats
    }

    /// Run the engine on a dedicated thread.
    pub fn spawn(mut self) -> Result<EngineHandle> {
        let stop = StopToken::new();
        let thread = thread::Builder::new()
            .name("integration-engine".into())
            .spawn({
                let stop = stop.clone();
                move || self.run(&stop)
            })
            .map_err(Error::Spawn)?;

        Ok(EngineHandle { stop, thread })
    }
}

/// A running engine thread.
#[derive(Debug)]
pub struct EngineHandle {
    stop: StopToken,
    thread: JoinHandle<EngineStats>,
}

impl EngineHandle {
    #[must_use]
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Request a stop and wait for the current tick to finish.
    pub fn stop(self) -> Result<EngineStats> {
        self.stop.request_stop();
        self.thread.join().map_err(|_| Error::EnginePanicked)
    }
}
