use nalgebra::Vector3;

use crate::{Error, Result};

/// Number of scalars stored per body: position, velocity and mass.
pub const FLOATS_PER_BODY: usize = 7;

/// A point mass.
///
/// Bodies carry no identity; the table addresses them by slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    mass: f64,
}

impl Body {
    /// Create a body, rejecting a non-positive mass and non-finite vectors.
    pub fn new(mass: f64, position: Vector3<f64>, velocity: Vector3<f64>) -> Result<Self> {
        if !(mass.is_finite() && mass > 0.) {
            return Err(Error::NonPositiveMass(mass));
        }
        check_finite("position", &position)?;
        check_finite("velocity", &velocity)?;

        Ok(Self {
            position,
            velocity,
            mass,
        })
    }

    /// A body at rest.
    pub fn at_rest(mass: f64, position: Vector3<f64>) -> Result<Self> {
        Self::new(mass, position, Vector3::zeros())
    }

    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// The body in table order `[x, y, z, vx, vy, vz, mass]`.
    #[must_use]
    pub fn to_fields(&self) -> [f64; FLOATS_PER_BODY] {
        let p = &self.position;
        let v = &self.velocity;
        [p.x, p.y, p.z, v.x, v.y, v.z, self.mass]
    }

    /// Decode a slot that is known to hold a body written by [`Body::to_fields`].
    pub(crate) fn from_fields(fields: [f64; FLOATS_PER_BODY]) -> Self {
        let [x, y, z, vx, vy, vz, mass] = fields;
        Self {
            position: Vector3::new(x, y, z),
            velocity: Vector3::new(vx, vy, vz),
            mass,
        }
    }

    /// Decode untrusted fields, e.g. from a buffer written by another process.
    pub fn try_from_fields(fields: [f64; FLOATS_PER_BODY]) -> Result<Self> {
        let body = Self::from_fields(fields);
        Self::new(body.mass, body.position, body.velocity)
    }
}

fn check_finite(field: &'static str, v: &Vector3<f64>) -> Result<()> {
    match v.iter().find(|c| !c.is_finite()) {
        Some(&value) => Err(Error::NonFinite { field, value }),
        None => Ok(()),
    }
}
