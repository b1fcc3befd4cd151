use nalgebra::Vector3;

use crate::body::Body;

/// Advance every body by one explicit Euler step:
///
/// ```text
/// v += F / m dt
/// x += v dt
/// ```
///
/// The position update uses the already updated velocity.
pub fn euler_step(bodies: &mut [Body], forces: &[Vector3<f64>], time_step: f64) {
    debug_assert_eq!(bodies.len(), forces.len());

    for (body, force) in bodies.iter_mut().zip(forces) {
        let acceleration = *force / body.mass();
        body.velocity += acceleration * time_step;
        let v = body.velocity;
        body.position += v * time_step;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn free_body_keeps_position() {
        let start = Vector3::new(1., -2., 3.);
        let mut bodies = [Body::at_rest(4., start).unwrap()];

        for _ in 0..100 {
            euler_step(&mut bodies, &[Vector3::zeros()], 0.7);
        }

        assert_eq!(bodies[0].position, start);
        assert_eq!(bodies[0].velocity, Vector3::zeros());
    }

    #[test]
    fn uniform_motion() {
        let mut bodies =
            [Body::new(1., Vector3::zeros(), Vector3::new(1., 0., -2.)).unwrap()];

        euler_step(&mut bodies, &[Vector3::zeros()], 0.5);
        euler_step(&mut bodies, &[Vector3::zeros()], 0.5);

        assert_relative_eq!(bodies[0].position, Vector3::new(1., 0., -2.));
    }

    #[test]
    fn velocity_before_position() {
        let mut bodies = [Body::at_rest(2., Vector3::zeros()).unwrap()];

        euler_step(&mut bodies, &[Vector3::new(4., 0., 0.)], 0.5);

        // a = 2, v = 1, x = v dt
        assert_relative_eq!(bodies[0].velocity, Vector3::new(1., 0., 0.));
        assert_relative_eq!(bodies[0].position, Vector3::new(0.5, 0., 0.));
    }

    #[test]
    fn zero_time_step() {
        let body = Body::new(1., Vector3::new(1., 1., 1.), Vector3::new(3., 2., 1.)).unwrap();
        let mut bodies = [body];

        euler_step(&mut bodies, &[Vector3::new(5., 5., 5.)], 0.);

        assert_eq!(bodies[0], body);
    }
}
