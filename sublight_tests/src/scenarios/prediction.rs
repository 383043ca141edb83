//! The Autonomous path: a locally-owned ship advances ahead of the server.

use crate::stepper::{Stepper, TestBody};
use approx::assert_relative_eq;
use bevy_math::Vec3;
use sublight_core::id::EntityId;
use sublight_core::state::{PhysicsMode, PhysicsState};
use test_log::test;

fn predicted_ship(stepper: &mut Stepper, velocity: Vec3) -> EntityId {
    let ship = EntityId(1);
    stepper.world.spawn(ship, TestBody::moving(Vec3::ZERO, velocity));
    stepper.manager.register_entity(ship, PhysicsMode::Autonomous);
    stepper.manager.enable_client_prediction(ship, true);
    stepper.manager.set_state(
        ship,
        PhysicsState {
            linear_velocity: velocity,
            ..Default::default()
        },
    );
    ship
}

#[test]
fn prediction_advances_the_owned_ship() {
    let mut stepper = Stepper::client();
    let ship = predicted_ship(&mut stepper, Vec3::new(10.0, 0.0, 0.0));

    // one simulated second at 20 fps
    stepper.step_frames(20);

    let state = stepper.manager.state(ship).unwrap();
    assert_relative_eq!(state.position.x, 10.0, epsilon = 1e-3);
    assert_relative_eq!(stepper.world.body(ship).position.x, 10.0, epsilon = 1e-3);
}

#[test]
fn sequence_numbers_strictly_increase_frame_over_frame() {
    let mut stepper = Stepper::client();
    let ship = predicted_ship(&mut stepper, Vec3::X);

    let mut last = stepper.manager.state(ship).unwrap().sequence;
    for _ in 0..30 {
        stepper.step();
        let sequence = stepper.manager.state(ship).unwrap().sequence;
        assert!(sequence > last);
        last = sequence;
    }
}

#[test]
fn prediction_is_opt_in() {
    let mut stepper = Stepper::client();
    let ship = EntityId(1);
    stepper
        .world
        .spawn(ship, TestBody::moving(Vec3::ZERO, Vec3::X));
    stepper.manager.register_entity(ship, PhysicsMode::Autonomous);
    stepper.manager.set_state(
        ship,
        PhysicsState {
            linear_velocity: Vec3::X,
            ..Default::default()
        },
    );

    stepper.step_frames(10);
    // never enabled: the recorded state does not advance
    assert_eq!(stepper.manager.state(ship).unwrap().sequence, 0);
    assert_relative_eq!(stepper.world.body(ship).position.x, 0.0);
}

#[test]
fn authority_entities_record_ground_truth_each_frame() {
    let mut stepper = Stepper::server();
    let ship = EntityId(1);
    stepper
        .world
        .spawn(ship, TestBody::moving(Vec3::ZERO, Vec3::X));
    stepper.manager.register_entity(ship, PhysicsMode::Authority);

    for frame in 0..10 {
        stepper.world.get_mut(ship).position = Vec3::new(frame as f32, 0.0, 0.0);
        stepper.step();
    }
    let state = stepper.manager.state(ship).unwrap();
    assert_eq!(state.sequence, 9);
    assert_relative_eq!(state.position.x, 9.0);
}

#[test]
fn input_samples_are_buffered_in_order() {
    let mut stepper = Stepper::client();
    let ship = predicted_ship(&mut stepper, Vec3::ZERO);

    assert!(
        stepper
            .manager
            .store_input_state(ship, bytes::Bytes::from_static(b"thrust"), 0.1)
    );
    assert!(
        !stepper
            .manager
            .store_input_state(ship, bytes::Bytes::from_static(b"replay"), 0.1)
    );
    assert!(
        stepper
            .manager
            .store_input_state(ship, bytes::Bytes::from_static(b"roll"), 0.2)
    );
}
