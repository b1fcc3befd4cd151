use nalgebra::Vector3;
use rand::{rngs::ThreadRng, Rng};
use rand_distr::{Distribution, Uniform};

use crate::{body::Body, config::SpawnConfig, Result};

pub trait BodyCreator {
    fn create_body(&mut self) -> Result<Body>;

    fn create_bodies(&mut self, n: usize) -> Result<Vec<Body>> {
        (0..n).map(|_| self.create_body()).collect()
    }
}

/// Spawns bodies uniformly inside the spawn area.
///
/// Every position component is drawn from `±spawn_area / 2`, every velocity
/// component from `±initial_velocity / 2`. The mass is `1 / u` with `u`
/// uniform in `(0, 1]`, so light bodies are common and heavy ones rare.
#[derive(Clone, Debug)]
pub struct RandomBodyCreator<R: Rng> {
    rng: R,
    position_distr: Uniform<f64>,
    velocity_distr: Uniform<f64>,
}

impl RandomBodyCreator<ThreadRng> {
    #[must_use]
    pub fn new(spawn: &SpawnConfig) -> Self {
        Self::with_rng(spawn, rand::thread_rng())
    }
}

impl<R: Rng> RandomBodyCreator<R> {
    #[must_use]
    pub fn with_rng(spawn: &SpawnConfig, rng: R) -> Self {
        let half_area = spawn.spawn_area() / 2.;
        let half_velocity = spawn.initial_velocity / 2.;
        Self {
            rng,
            position_distr: Uniform::new_inclusive(-half_area, half_area),
            velocity_distr: Uniform::new_inclusive(-half_velocity, half_velocity),
        }
    }

    fn sample_vector(&mut self, distr: Uniform<f64>) -> Vector3<f64> {
        let rng = &mut self.rng;
        Vector3::new(distr.sample(rng), distr.sample(rng), distr.sample(rng))
    }
}

impl<R: Rng> BodyCreator for RandomBodyCreator<R> {
    fn create_body(&mut self) -> Result<Body> {
        // gen yields [0, 1)
        let mass = 1. / (1. - self.rng.gen::<f64>());
        let position = self.sample_vector(self.position_distr);
        let velocity = self.sample_vector(self.velocity_distr);

        Body::new(mass, position, velocity)
    }
}
