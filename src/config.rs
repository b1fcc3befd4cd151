//! Engine and spawn configuration.
//!
//! A configuration file is plain TOML; every key is optional:
//!
//! ```toml
//! capacity = 1000
//!
//! [engine]
//! time_step = 0.001
//! gravitational_constant = 6.6743015e-11
//! distance_scale = 0.05
//!
//! [spawn]
//! box_size = 20.0
//! initial_velocity = 0.01
//! ```

use std::{
    fs,
    path::Path,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{gravity::G, Error, Result};

/// Edge length of the cube the bodies are spawned in and the camera looks at.
pub const BOX_SIZE: f64 = 20.;

/// Default table capacity.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Parameters of the integration engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial time step. Changed at runtime through [`TimeStep`].
    pub time_step: f64,
    pub gravitational_constant: f64,
    /// Factor applied to coordinate differences before the force is evaluated.
    pub distance_scale: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_step: 0.001,
            gravitational_constant: G,
            distance_scale: 1. / BOX_SIZE,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    #[must_use]
    pub fn gravitational_constant(mut self, gravitational_constant: f64) -> Self {
        self.gravitational_constant = gravitational_constant;
        self
    }

    #[must_use]
    pub fn distance_scale(mut self, distance_scale: f64) -> Self {
        self.distance_scale = distance_scale;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.time_step.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "time_step has to be finite, got {}",
                self.time_step
            )));
        }
        if !self.gravitational_constant.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "gravitational_constant has to be finite, got {}",
                self.gravitational_constant
            )));
        }
        if !(self.distance_scale.is_finite() && self.distance_scale > 0.) {
            return Err(Error::InvalidConfig(format!(
                "distance_scale has to be positive and finite, got {}",
                self.distance_scale
            )));
        }
        Ok(())
    }
}

/// Rules for randomly spawned bodies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub box_size: f64,
    /// Width of each velocity component's range, centered on zero.
    pub initial_velocity: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            box_size: BOX_SIZE,
            initial_velocity: 0.01,
        }
    }
}

impl SpawnConfig {
    /// Width of each position component's range, centered on the origin.
    #[must_use]
    pub fn spawn_area(&self) -> f64 {
        self.box_size / 2.
    }
}

/// Everything needed to set up a [`Simulation`](crate::Simulation).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub capacity: usize,
    pub engine: EngineConfig,
    pub spawn: SpawnConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            engine: EngineConfig::default(),
            spawn: SpawnConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        if !(self.spawn.box_size.is_finite() && self.spawn.box_size > 0.) {
            return Err(Error::InvalidConfig(format!(
                "box_size has to be positive and finite, got {}",
                self.spawn.box_size
            )));
        }
        if !(self.spawn.initial_velocity.is_finite() && self.spawn.initial_velocity >= 0.) {
            return Err(Error::InvalidConfig(format!(
                "initial_velocity has to be non-negative and finite, got {}",
                self.spawn.initial_velocity
            )));
        }
        self.engine.validate()
    }
}

/// The live time step control.
///
/// Clones share the same value. The engine reads it once per tick, so a new
/// value takes effect on the following tick at the latest.
#[derive(Clone, Debug)]
pub struct TimeStep(Arc<AtomicU64>);

impl TimeStep {
    pub fn new(time_step: f64) -> Result<Self> {
        check_time_step(time_step)?;
        Ok(Self(Arc::new(AtomicU64::new(time_step.to_bits()))))
    }

    #[must_use]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, time_step: f64) -> Result<()> {
        check_time_step(time_step)?;
        self.0.store(time_step.to_bits(), Ordering::Relaxed);
        debug!(time_step, "time step changed");
        Ok(())
    }
}

fn check_time_step(time_step: f64) -> Result<()> {
    if time_step.is_finite() {
        Ok(())
    } else {
        Err(Error::NonFinite {
            field: "time_step",
            value: time_step,
        })
    }
}
