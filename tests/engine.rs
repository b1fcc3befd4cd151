use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use nalgebra::Vector3;
use nbody_live::{
    presentation::FrameSync, Body, BodyCreator, EngineConfig, IntegrationEngine,
    RandomBodyCreator, Simulation, SimulationState, SpawnConfig, TimeStep,
};
use rand::{rngs::StdRng, SeedableRng};

fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(1));
    }
}

fn unit_config() -> EngineConfig {
    EngineConfig::default()
        .time_step(1e-3)
        .gravitational_constant(1.)
        .distance_scale(1.)
}

#[test]
fn engine_moves_bodies_in_background() {
    let mut sim = Simulation::new(2, unit_config()).unwrap();
    sim.add_body(&Body::at_rest(1., Vector3::new(-1., 0., 0.)).unwrap());
    sim.add_body(&Body::at_rest(1., Vector3::new(1., 0., 0.)).unwrap());

    sim.start().unwrap();
    wait_until(|| sim.snapshot()[0].position.x > -1.);
    let stats = sim.stop().unwrap();
    assert!(stats.ticks > 0);

    let bodies = sim.snapshot();
    assert!(bodies[0].position.x > -1.);
    assert!(bodies[1].position.x < 1.);
    // no tick is running anymore
    assert_eq!(sim.snapshot(), bodies);
}

#[test]
fn bodies_added_while_running() {
    let mut sim = Simulation::new(64, EngineConfig::default()).unwrap();
    sim.start().unwrap();

    let mut creator =
        RandomBodyCreator::with_rng(&SpawnConfig::default(), StdRng::seed_from_u64(9));
    let mut frame = FrameSync::new();
    let mut visuals = 0;

    for body in creator.create_bodies(64).unwrap() {
        let slot = sim.add_body(&body);

        let update = frame.refresh(sim.state());
        assert_eq!(update.bodies.len(), slot + 1);
        visuals += update.new_slots.len();
        // the new body is complete, even if the engine already moved it
        assert_eq!(update.bodies[slot].mass(), body.mass());
        assert!(update
            .bodies
            .iter()
            .all(|b| b.position.iter().all(|c| c.is_finite())));
    }
    assert_eq!(visuals, 64);

    sim.stop().unwrap();
}

#[test]
fn overwrite_while_running() {
    let state = Arc::new(SimulationState::new(2).unwrap());
    let heavy = Body::at_rest(1e3, Vector3::zeros()).unwrap();
    state.append(&heavy);
    state.append(&Body::at_rest(1., Vector3::new(5., 0., 0.)).unwrap());

    let config = unit_config();
    let handle = IntegrationEngine::new(
        Arc::clone(&state),
        TimeStep::new(config.time_step).unwrap(),
        &config,
    )
    .unwrap()
    .spawn()
    .unwrap();

    // replaces slot 0, far away so it barely moves afterwards
    let replacement = Body::at_rest(2., Vector3::new(-1e6, 0., 0.)).unwrap();
    assert_eq!(state.append(&replacement), 0);
    thread::sleep(Duration::from_millis(20));
    handle.stop().unwrap();

    let bodies = state.snapshot();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0].mass(), 2.);
    assert!(bodies[0].position.x < -9e5);
}

#[test]
fn live_time_step_reaches_engine() {
    let mut sim = Simulation::new(1, unit_config()).unwrap();
    sim.add_body(&Body::new(1., Vector3::zeros(), Vector3::new(1., 0., 0.)).unwrap());

    sim.time_step().set(0.).unwrap();
    sim.start().unwrap();
    thread::sleep(Duration::from_millis(10));
    assert_eq!(sim.snapshot()[0].position.x, 0.);

    sim.time_step().set(1e-3).unwrap();
    wait_until(|| sim.snapshot()[0].position.x > 0.);
    sim.stop().unwrap();
}
