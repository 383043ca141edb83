//! The Simulated path: remote proxies blend toward updates, then coast.

use crate::stepper::{Stepper, TestBody};
use approx::assert_relative_eq;
use bevy_math::Vec3;
use sublight_core::id::EntityId;
use sublight_core::state::{PhysicsMode, PhysicsState};
use test_log::test;

fn proxy(stepper: &mut Stepper) -> EntityId {
    let ship = EntityId(2);
    stepper.world.spawn(ship, TestBody::default());
    stepper.manager.register_entity(ship, PhysicsMode::Simulated);
    ship
}

#[test]
fn proxy_blends_toward_the_received_state() {
    let mut stepper = Stepper::client();
    let ship = proxy(&mut stepper);

    let update = PhysicsState {
        position: Vec3::new(10.0, 0.0, 0.0),
        timestamp: 0.05,
        sequence: 1,
        ..Default::default()
    };
    assert!(
        stepper
            .manager
            .receive_server_state(&mut stepper.world, ship, update)
    );

    // the default interpolation delay is 100 ms: two 50 ms frames
    stepper.step();
    assert_relative_eq!(stepper.world.body(ship).position.x, 5.0, epsilon = 1e-4);
    stepper.step();
    assert_relative_eq!(stepper.world.body(ship).position.x, 10.0, epsilon = 1e-4);
}

#[test]
fn stale_updates_for_proxies_are_rejected() {
    let mut stepper = Stepper::client();
    let ship = proxy(&mut stepper);

    let fresh = PhysicsState {
        position: Vec3::new(10.0, 0.0, 0.0),
        timestamp: 0.2,
        sequence: 2,
        ..Default::default()
    };
    assert!(
        stepper
            .manager
            .receive_server_state(&mut stepper.world, ship, fresh)
    );
    let stale = PhysicsState {
        position: Vec3::new(-50.0, 0.0, 0.0),
        timestamp: 0.1,
        sequence: 1,
        ..Default::default()
    };
    assert!(
        !stepper
            .manager
            .receive_server_state(&mut stepper.world, ship, stale)
    );
    assert_relative_eq!(stepper.manager.state(ship).unwrap().position.x, 10.0);
}

#[test]
fn silent_proxies_extrapolate_a_bounded_distance() {
    let mut stepper = Stepper::client();
    let ship = proxy(&mut stepper);

    // last known state: moving at 5 m/s along x
    let update = PhysicsState {
        position: Vec3::new(10.0, 0.0, 0.0),
        linear_velocity: Vec3::new(5.0, 0.0, 0.0),
        timestamp: 0.05,
        sequence: 1,
        ..Default::default()
    };
    stepper
        .manager
        .receive_server_state(&mut stepper.world, ship, update);

    // blend out, then go silent for a full simulated second
    stepper.step_frames(22);

    // displacement is clamped to max_extrapolation (0.2 s): 1 m, not 5 m
    assert_relative_eq!(stepper.world.body(ship).position.x, 11.0, epsilon = 1e-3);
    stepper.step_frames(10);
    assert_relative_eq!(stepper.world.body(ship).position.x, 11.0, epsilon = 1e-3);
}

#[test]
fn mode_changes_drop_leftover_sessions() {
    let mut stepper = Stepper::client();
    let ship = proxy(&mut stepper);

    let update = PhysicsState {
        position: Vec3::new(10.0, 0.0, 0.0),
        timestamp: 0.05,
        sequence: 1,
        ..Default::default()
    };
    stepper
        .manager
        .receive_server_state(&mut stepper.world, ship, update);
    stepper.manager.set_mode(ship, PhysicsMode::Autonomous);

    // no session left to drive the body
    stepper.step();
    assert_relative_eq!(stepper.world.body(ship).position.x, 0.0);
}
