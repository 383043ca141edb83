//! Correcting a predicted ship once the authoritative state arrives.

use crate::stepper::{Stepper, TestBody};
use approx::assert_relative_eq;
use bevy_math::Vec3;
use std::cell::RefCell;
use std::rc::Rc;
use sublight_core::id::EntityId;
use sublight_core::state::{PhysicsMode, PhysicsState};
use sublight::prediction::reconciliation::CorrectionKind;
use test_log::test;

fn predicted_ship(stepper: &mut Stepper) -> EntityId {
    let ship = EntityId(1);
    stepper.world.spawn(ship, TestBody::default());
    stepper.manager.register_entity(ship, PhysicsMode::Autonomous);
    stepper.manager.enable_client_prediction(ship, true);
    stepper.manager.set_state(ship, PhysicsState::default());
    ship
}

fn authoritative(position: Vec3, timestamp: f64, sequence: u64) -> PhysicsState {
    PhysicsState {
        position,
        timestamp,
        sequence,
        ..Default::default()
    }
}

#[test]
fn divergence_snaps_the_ship_to_the_server() {
    let mut stepper = Stepper::client();
    let ship = predicted_ship(&mut stepper);

    let corrections = Rc::new(RefCell::new(Vec::new()));
    let sink = corrections.clone();
    stepper
        .manager
        .on_correction(move |event| sink.borrow_mut().push(*event));

    // 100 m of drift against the default 5 m threshold
    let truth = authoritative(Vec3::new(100.0, 0.0, 0.0), 0.1, 1);
    assert!(
        stepper
            .manager
            .reconcile_with_server(&mut stepper.world, ship, truth)
    );

    assert_relative_eq!(stepper.world.body(ship).position.x, 100.0);
    assert_relative_eq!(stepper.manager.state(ship).unwrap().position.x, 100.0);
    assert_eq!(corrections.borrow().len(), 1);
    assert_eq!(corrections.borrow()[0].kind, CorrectionKind::Snap);
}

#[test]
fn small_drift_blends_out_invisibly() {
    let mut stepper = Stepper::client();
    let ship = predicted_ship(&mut stepper);

    // 2 m of drift: below the 5 m snap threshold, above the jitter gate
    let truth = authoritative(Vec3::new(2.0, 0.0, 0.0), 0.1, 1);
    assert!(
        stepper
            .manager
            .reconcile_with_server(&mut stepper.world, ship, truth)
    );

    // the truth is recorded immediately, the ship has not visibly moved
    assert_relative_eq!(stepper.manager.state(ship).unwrap().position.x, 2.0);
    assert_relative_eq!(stepper.world.body(ship).position.x, 0.0);

    // the default correction delay is 100 ms: two 50 ms frames to blend out
    stepper.step();
    assert_relative_eq!(stepper.world.body(ship).position.x, 1.0, epsilon = 1e-4);
    stepper.step();
    assert_relative_eq!(stepper.world.body(ship).position.x, 2.0, epsilon = 1e-4);
}

#[test]
fn negligible_drift_is_ignored() {
    let mut stepper = Stepper::client();
    let ship = predicted_ship(&mut stepper);

    // 0.2 m: below 10% of the 5 m threshold
    let truth = authoritative(Vec3::new(0.2, 0.0, 0.0), 0.1, 1);
    assert!(
        stepper
            .manager
            .reconcile_with_server(&mut stepper.world, ship, truth)
    );
    assert_relative_eq!(stepper.manager.state(ship).unwrap().position.x, 0.0);
    assert_eq!(stepper.manager.prediction_stats().reconciliations, 0);
}

#[test]
fn stale_authoritative_updates_are_rejected() {
    let mut stepper = Stepper::client();
    let ship = predicted_ship(&mut stepper);

    let fresh = authoritative(Vec3::new(100.0, 0.0, 0.0), 0.2, 2);
    assert!(
        stepper
            .manager
            .reconcile_with_server(&mut stepper.world, ship, fresh)
    );
    // an older update arriving late must not move anything
    let late = authoritative(Vec3::new(50.0, 0.0, 0.0), 0.1, 1);
    assert!(
        !stepper
            .manager
            .reconcile_with_server(&mut stepper.world, ship, late)
    );
    assert_relative_eq!(stepper.world.body(ship).position.x, 100.0);
}

#[test]
fn reconciliation_only_applies_to_autonomous_entities() {
    let mut stepper = Stepper::client();
    let ship = EntityId(1);
    stepper.world.spawn(ship, TestBody::default());
    stepper.manager.register_entity(ship, PhysicsMode::Authority);

    let truth = authoritative(Vec3::new(100.0, 0.0, 0.0), 0.1, 1);
    assert!(
        !stepper
            .manager
            .reconcile_with_server(&mut stepper.world, ship, truth)
    );
}
