use std::{sync::mpsc, thread};

use nalgebra::Vector3;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
    body::Body,
    gravity::{self, ForceParams},
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Execution {
    #[default]
    SingleThreaded,
    Multithreaded {
        num_threads: usize,
    },
    #[cfg(feature = "rayon")]
    RayonIter,
}

/// Exact O(n²) force calculation.
#[derive(Copy, Clone, Debug, Default)]
pub struct DirectSummation {
    execution: Execution,
}

impl DirectSummation {
    #[must_use]
    pub fn new() -> Self {
        Self {
            execution: Execution::SingleThreaded,
        }
    }

    /// Calculate the forces with multiple threads.
    ///
    /// Every thread takes a contiguous part of the bodies and calculates
    /// the forces they exert on all bodies.
    #[must_use]
    pub fn multithreaded(mut self, num_threads: usize) -> Self {
        self.execution = Execution::Multithreaded {
            num_threads: num_threads.max(1),
        };
        self
    }

    /// Use Rayon to calculate the forces with multiple threads.
    ///
    /// The bodies receiving the forces are split between the threads.
    #[cfg(feature = "rayon")]
    #[must_use]
    pub fn rayon_iter(mut self) -> Self {
        self.execution = Execution::RayonIter;
        self
    }

    #[must_use]
    pub fn execution(&self) -> Execution {
        self.execution
    }

    /// Overwrite `forces[i]` with the net force on `bodies[i]`.
    pub fn calculate_forces(
        &self,
        bodies: &[Body],
        forces: &mut [Vector3<f64>],
        params: &ForceParams,
    ) {
        debug_assert_eq!(bodies.len(), forces.len());

        match self.execution {
            Execution::SingleThreaded => {
                forces.fill(Vector3::zeros());

                // each pair once, applied to both bodies
                for (i, b1) in bodies.iter().enumerate() {
                    for (j, b2) in bodies.iter().enumerate().skip(i + 1) {
                        let f =
                            gravity::force(b1.position, b1.mass(), b2.position, b2.mass(), params);
                        forces[i] += f;
                        forces[j] -= f;
                    }
                }
            }
            Execution::Multithreaded { num_threads } => {
                let (tx, rx) = mpsc::channel();

                let mut chunks: Vec<_> = (0..=num_threads)
                    .map(|i| i * (bodies.len() / num_threads))
                    .collect();
                chunks[num_threads] += bodies.len() % num_threads;

                thread::scope(|s| {
                    for i in 0..num_threads {
                        let tx = &tx;
                        let local_bodies = &bodies[chunks[i]..chunks[i + 1]];

                        s.spawn(move || {
                            let local_forces: Vec<_> = bodies
                                .iter()
                                .map(|b1| {
                                    local_bodies
                                        .iter()
                                        .map(|b2| {
                                            gravity::force(
                                                b1.position,
                                                b1.mass(),
                                                b2.position,
                                                b2.mass(),
                                                params,
                                            )
                                        })
                                        .sum::<Vector3<f64>>()
                                })
                                .collect();
                            // the receiver outlives the scope
                            let _ = tx.send(local_forces);
                        });
                    }
                });

                forces.fill(Vector3::zeros());

                for local_forces in rx.iter().take(num_threads) {
                    for (f, local) in forces.iter_mut().zip(local_forces) {
                        *f += local;
                    }
                }
            }
            #[cfg(feature = "rayon")]
            Execution::RayonIter => {
                forces.par_iter_mut().enumerate().for_each(|(i, f)| {
                    let b1 = &bodies[i];
                    *f = Vector3::zeros();
                    for (j, b2) in bodies.iter().enumerate() {
                        if i == j {
                            continue;
                        }
                        *f += gravity::force(b1.position, b1.mass(), b2.position, b2.mass(), params);
                    }
                });
            }
        }
    }
}
