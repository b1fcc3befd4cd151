use std::sync::Arc;

use tracing::warn;

use crate::{
    body::Body,
    config::{EngineConfig, SimulationConfig, TimeStep},
    direct_summation::DirectSummation,
    engine::{EngineHandle, EngineStats, IntegrationEngine},
    state::SimulationState,
    Error, Result,
};

/// The presentation side of a running simulation.
///
/// Owns the shared table and the time step control and hands both to the
/// integration engine when it is started. The engine is stopped when the
/// simulation is dropped.
#[derive(Debug)]
pub struct Simulation {
    state: Arc<SimulationState>,
    time_step: TimeStep,
    config: EngineConfig,
    solver: DirectSummation,
    engine: Option<EngineHandle>,
}

impl Simulation {
    pub fn new(capacity: usize, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            state: Arc::new(SimulationState::new(capacity)?),
            time_step: TimeStep::new(config.time_step)?,
            config,
            solver: DirectSummation::new(),
            engine: None,
        })
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.capacity, config.engine)
    }

    /// Force calculation used by engines started from now on.
    #[must_use]
    pub fn solver(mut self, solver: DirectSummation) -> Self {
        self.solver = solver;
        self
    }

    #[must_use]
    pub fn state(&self) -> &Arc<SimulationState> {
        &self.state
    }

    /// The live time step control.
    #[must_use]
    pub fn time_step(&self) -> &TimeStep {
        &self.time_step
    }

    /// Append a body to the table, see [`SimulationState::append`].
    pub fn add_body(&self, body: &Body) -> usize {
        self.state.append(body)
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Body> {
        self.state.snapshot()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.engine.is_some()
    }

    /// Start the integration engine on its own thread.
    pub fn start(&mut self) -> Result<()> {
        if self.engine.is_some() {
            return Err(Error::AlreadyRunning);
        }

        let engine = IntegrationEngine::new(
            Arc::clone(&self.state),
            self.time_step.clone(),
            &self.config,
        )?
        .solver(self.solver);
        self.engine = Some(engine.spawn()?);

        Ok(())
    }

    /// Stop the integration engine and wait for it to finish its tick.
    pub fn stop(&mut self) -> Result<EngineStats> {
        self.engine.take().ok_or(Error::NotRunning)?.stop()
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.take() {
            if let Err(err) = engine.stop() {
                warn!(%err, "integration engine did not shut down cleanly");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;

    #[test]
    fn lifecycle() {
        let mut sim = Simulation::new(4, EngineConfig::default()).unwrap();
        assert!(!sim.is_running());
        assert!(matches!(sim.stop(), Err(Error::NotRunning)));

        sim.start().unwrap();
        assert!(sim.is_running());
        assert!(matches!(sim.start(), Err(Error::AlreadyRunning)));

        sim.stop().unwrap();
        assert!(!sim.is_running());

        // an engine may be handed the table again
        sim.start().unwrap();
        sim.stop().unwrap();
    }

    #[test]
    fn add_body_then_snapshot() {
        let sim = Simulation::new(2, EngineConfig::default()).unwrap();
        let body = Body::new(3., Vector3::new(1., 2., 3.), Vector3::new(0., 0., 1.)).unwrap();

        assert_eq!(sim.add_body(&body), 0);
        assert_eq!(sim.snapshot(), [body]);
    }

    #[test]
    fn invalid_setup() {
        assert!(matches!(
            Simulation::new(0, EngineConfig::default()),
            Err(Error::ZeroCapacity)
        ));
        assert!(matches!(
            Simulation::new(1, EngineConfig::default().time_step(f64::NAN)),
            Err(Error::InvalidConfig(_))
        ));

        let config = SimulationConfig {
            capacity: 8,
            ..SimulationConfig::default()
        };
        assert_eq!(Simulation::from_config(&config).unwrap().state().capacity(), 8);
    }

    #[test]
    fn drop_stops_engine() {
        let mut sim = Simulation::new(1, EngineConfig::default()).unwrap();
        sim.start().unwrap();
        let stop = sim.engine.as_ref().unwrap().stop_token();

        drop(sim);
        assert!(stop.is_stop_requested());
    }
}
