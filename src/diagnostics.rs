//! Conserved quantities, for sanity checks and logging.

use nalgebra::Vector3;

use crate::{body::Body, gravity::ForceParams};

#[must_use]
pub fn total_mass(bodies: &[Body]) -> f64 {
    bodies.iter().map(Body::mass).sum()
}

#[must_use]
pub fn total_momentum(bodies: &[Body]) -> Vector3<f64> {
    bodies.iter().map(|b| b.velocity * b.mass()).sum()
}

#[must_use]
pub fn kinetic_energy(bodies: &[Body]) -> f64 {
    bodies
        .iter()
        .map(|b| 0.5 * b.mass() * b.velocity.norm_squared())
        .sum()
}

/// Potential energy in the units of the force, i.e. with the scaled distance.
/// Coincident pairs are left out, like in the force.
#[must_use]
pub fn potential_energy(bodies: &[Body], params: &ForceParams) -> f64 {
    let mut energy = 0.;
    for (i, b1) in bodies.iter().enumerate() {
        for b2 in &bodies[i + 1..] {
            let r = ((b2.position - b1.position) * params.distance_scale).norm();
            if r > 0. {
                energy -= params.gravitational_constant * b1.mass() * b2.mass() / r;
            }
        }
    }
    energy
}

/// `None` for an empty slice.
#[must_use]
pub fn center_of_mass(bodies: &[Body]) -> Option<Vector3<f64>> {
    let mass = total_mass(bodies);
    if bodies.is_empty() {
        return None;
    }
    let weighted: Vector3<f64> = bodies.iter().map(|b| b.position * b.mass()).sum();
    Some(weighted / mass)
}
