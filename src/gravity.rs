use nalgebra::Vector3;

use crate::config::EngineConfig;

pub const G: f64 = 6.6743015e-11;

/// Constants of the pairwise force.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceParams {
    pub gravitational_constant: f64,
    pub distance_scale: f64,
}

impl From<&EngineConfig> for ForceParams {
    fn from(config: &EngineConfig) -> Self {
        Self {
            gravitational_constant: config.gravitational_constant,
            distance_scale: config.distance_scale,
        }
    }
}

/// Force exerted on body 1 by body 2.
///
/// The displacement is scaled by `distance_scale` before use. Coincident
/// bodies exert no force on each other.
#[must_use]
pub fn force(
    position1: Vector3<f64>,
    mass1: f64,
    position2: Vector3<f64>,
    mass2: f64,
    params: &ForceParams,
) -> Vector3<f64> {
    let d = (position2 - position1) * params.distance_scale;
    let d_square = d.norm_squared();
    if d_square == 0. {
        return Vector3::zeros();
    }

    // |F| d / |d| with |F| = G m1 m2 / |d|^2, direction first so tiny |d| stays finite
    (d / d_square.sqrt()) * (params.gravitational_constant * mass1 * mass2 / d_square)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const UNIT: ForceParams = ForceParams {
        gravitational_constant: 1.,
        distance_scale: 1.,
    };

    #[test]
    fn attraction() {
        let f = force(Vector3::new(1., 0., 0.), 1., Vector3::new(-1., 0., 0.), 1., &UNIT);

        assert!(f[0] < 0.);
        assert_relative_eq!(f, Vector3::new(-0.25, 0., 0.));
    }

    #[test]
    fn third_law() {
        let p1 = Vector3::new(0.3, -1.2, 4.);
        let p2 = Vector3::new(-2., 0.7, 1.5);
        let params = ForceParams {
            gravitational_constant: G,
            distance_scale: 0.05,
        };

        let f12 = force(p1, 3e9, p2, 5e8, &params);
        let f21 = force(p2, 5e8, p1, 3e9, &params);
        assert_relative_eq!(f12 + f21, Vector3::zeros(), epsilon = 1e-12 * f12.norm());
    }

    #[test]
    fn distance_scale() {
        let scaled = ForceParams {
            gravitational_constant: 1.,
            distance_scale: 0.5,
        };
        let f = force(Vector3::zeros(), 2., Vector3::new(0., 4., 0.), 3., &scaled);

        // scaled distance 2
        assert_relative_eq!(f, Vector3::new(0., 1.5, 0.));
    }

    #[test]
    fn tiny_separation() {
        let f = force(Vector3::zeros(), 1., Vector3::new(1e-110, 0., 0.), 1., &UNIT);

        assert!(f.iter().all(|c| c.is_finite()));
        assert_relative_eq!(f, Vector3::new(1e220, 0., 0.), max_relative = 1e-12);
    }

    #[test]
    fn coincident_bodies() {
        let p = Vector3::new(1., 2., 3.);
        let f = force(p, 1e6, p, 1e6, &UNIT);

        assert_eq!(f, Vector3::zeros());
    }
}
