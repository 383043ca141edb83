//! Rewinding entities for server-side interaction checks.

use crate::stepper::{Stepper, TestBody};
use approx::assert_relative_eq;
use bevy_math::Vec3;
use sublight_core::id::EntityId;
use sublight_core::state::PhysicsMode;
use test_log::test;

fn tracked_ship(stepper: &mut Stepper) -> EntityId {
    let ship = EntityId(1);
    stepper.world.spawn(ship, TestBody::default());
    stepper.manager.register_entity(ship, PhysicsMode::Authority);
    ship
}

#[test]
fn the_server_can_rewind_to_where_a_target_appeared() {
    let mut stepper = Stepper::server();
    let ship = tracked_ship(&mut stepper);

    // fly a straight line, one meter per frame
    for frame in 0..20 {
        stepper.world.get_mut(ship).position = Vec3::new(frame as f32, 0.0, 0.0);
        stepper.step();
    }

    // an attacker saw the target ~0.52 s into the session; the closest
    // recorded sample is the frame captured at t=0.50
    let past = stepper.manager.historical_state(ship, 0.52).unwrap();
    assert_relative_eq!(past.position.x, 9.0);

    // asking before any history clamps to the oldest sample
    let oldest = stepper.manager.historical_state(ship, -10.0).unwrap();
    assert_relative_eq!(oldest.position.x, 0.0);
}

#[test]
fn unregistered_entities_have_no_past() {
    let stepper = Stepper::server();
    assert!(stepper.manager.historical_state(EntityId(9), 1.0).is_none());
}

#[test]
fn old_history_is_swept_on_the_cleanup_cadence() {
    let mut stepper = Stepper::server();
    let ship = tracked_ship(&mut stepper);

    // 10.5 simulated seconds: the 10 s cadence fires with 2 s of max age
    stepper.step_frames(210);

    let oldest = stepper.manager.historical_state(ship, 0.0).unwrap();
    assert!(
        oldest.timestamp >= 8.0,
        "history older than max_age survived the sweep: {}",
        oldest.timestamp
    );
}
