//! The validation pipeline end to end: reports, checks, votes, trust.

use crate::stepper::{UniformGravity, ZeroLatency};
use approx::assert_relative_eq;
use bevy_math::Vec3;
use std::cell::RefCell;
use std::rc::Rc;
use sublight_consensus::environment::NoGravity;
use sublight_consensus::report::PositionReport;
use sublight_consensus::trust::TrustState;
use sublight_consensus::validator::ConsensusValidator;
use sublight_consensus::voting::ValidationVote;
use sublight_core::id::{PlayerId, ValidatorId};
use test_log::test;

fn report(
    player: PlayerId,
    position: Vec3,
    velocity: Vec3,
    timestamp: f64,
    sequence: u64,
) -> PositionReport {
    PositionReport {
        player,
        position,
        velocity,
        thrust: Vec3::ZERO,
        timestamp,
        sequence,
    }
}

/// Run one report through the check-vote-consensus-trust round, with three
/// validators all measuring the same thing.
fn validation_round(
    validator: &mut ConsensusValidator,
    player: PlayerId,
    incoming: PositionReport,
) -> TrustState {
    let check = validator.validate_position(
        player,
        incoming.position,
        incoming.timestamp,
        &NoGravity,
        &ZeroLatency,
    );
    for peer in 0..3 {
        validator.submit_vote(ValidationVote {
            validator: ValidatorId(peer),
            target: player,
            sequence: incoming.sequence,
            is_valid: check.is_valid,
            position_error: check.position_error,
        });
    }
    let result = validator.calculate_consensus(player, incoming.sequence);
    assert!(result.consensus_reached);
    let passed = result.valid_votes > result.invalid_votes;
    validator.add_report(incoming);
    validator
        .update_validation_state(player, passed, incoming.timestamp)
        .unwrap()
}

#[test]
fn an_honest_pilot_stays_trusted() {
    let mut validator = ConsensusValidator::default();
    let player = PlayerId(1);
    validator.register_player(player);

    let velocity = Vec3::new(10.0, 0.0, 0.0);
    validator.add_report(report(player, Vec3::ZERO, velocity, 0.0, 0));

    for round in 1..=10u64 {
        let honest = report(
            player,
            Vec3::new(round as f32 * 10.0, 0.0, 0.0),
            velocity,
            round as f64,
            round,
        );
        let state = validation_round(&mut validator, player, honest);
        assert_eq!(state, TrustState::Trusted);
    }
    assert!(!validator.should_kick_player(player));
}

#[test]
fn a_teleporter_escalates_to_a_kick() {
    let mut validator = ConsensusValidator::default();
    let player = PlayerId(1);
    validator.register_player(player);
    validator.add_report(report(player, Vec3::ZERO, Vec3::ZERO, 0.0, 0));

    let kicks = Rc::new(RefCell::new(Vec::new()));
    let sink = kicks.clone();
    validator.on_trust_changed(move |event| sink.borrow_mut().push(event.current));

    let mut states = Vec::new();
    for round in 1..=5u64 {
        // claims to cross a kilometer per second while reporting zero thrust
        let teleport = report(
            player,
            Vec3::new(round as f32 * 1_000.0, 0.0, 0.0),
            Vec3::ZERO,
            round as f64,
            round,
        );
        states.push(validation_round(&mut validator, player, teleport));
    }

    assert_eq!(
        states,
        vec![
            TrustState::Suspect,
            TrustState::Suspect,
            TrustState::Flagged,
            TrustState::Flagged,
            TrustState::Kicked,
        ]
    );
    assert!(validator.should_kick_player(player));
    assert_eq!(
        *kicks.borrow(),
        vec![TrustState::Suspect, TrustState::Flagged, TrustState::Kicked]
    );

    // kicked is terminal: even an honest report cannot restore standing
    let honest = report(player, Vec3::new(5_000.0, 0.0, 0.0), Vec3::ZERO, 6.0, 6);
    let state = validation_round(&mut validator, player, honest);
    assert_eq!(state, TrustState::Kicked);

    // until the session manager explicitly resets it
    validator.reset_validation_state(player);
    assert_eq!(validator.validation_state(player), Some(TrustState::Trusted));
}

#[test]
fn gravity_is_part_of_the_expected_trajectory() {
    let mut validator = ConsensusValidator::default();
    let player = PlayerId(1);
    validator.register_player(player);
    validator.add_report(report(player, Vec3::ZERO, Vec3::ZERO, 0.0, 0));

    // a 1 kN pull on a 1000 kg ship: 1 m/s² downward, so a free-falling
    // honest report lands at y = -a·t²/2 = -0.5 after one second
    let gravity = UniformGravity(Vec3::new(0.0, -1_000.0, 0.0));
    let check = validator.validate_position(
        player,
        Vec3::new(0.0, -0.5, 0.0),
        1.0,
        &gravity,
        &ZeroLatency,
    );
    assert!(check.is_valid);
    assert_relative_eq!(check.position_error, 0.0, epsilon = 1e-5);

    // hovering against a strong field while claiming zero thrust: the
    // implied counter-thrust (100 kN) is far outside the tolerance
    let strong_field = UniformGravity(Vec3::new(0.0, -100_000.0, 0.0));
    assert!(!validator.validate_thrust(player, Vec3::ZERO, Vec3::ZERO, 1.0, &strong_field));
    // an honest hover claim names the counter-thrust and passes
    assert!(validator.validate_thrust(
        player,
        Vec3::new(0.0, 100_000.0, 0.0),
        Vec3::ZERO,
        1.0,
        &strong_field,
    ));
}

#[test]
fn consensus_splits_below_the_supermajority_stay_open() {
    let mut validator = ConsensusValidator::default();
    let player = PlayerId(1);
    validator.register_player(player);

    for (peer, verdict) in [(0u64, true), (1, true), (2, false)] {
        validator.submit_vote(ValidationVote {
            validator: ValidatorId(peer),
            target: player,
            sequence: 1,
            is_valid: verdict,
            position_error: 0.5,
        });
    }
    let result = validator.calculate_consensus(player, 1);
    assert_eq!(result.valid_votes, 2);
    assert_eq!(result.invalid_votes, 1);
    assert!(!result.consensus_reached);
}
