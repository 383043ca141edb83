//! The three plausibility checks validators run against a report.
//!
//! A failed check is business output (`is_valid = false`), never an error:
//! the trust-state machine consumes it. Checks fail closed — a report whose
//! timestamps cannot support the math is invalid, not skipped.

use bevy_math::Vec3;
use tracing::trace;

use crate::config::ConsensusConfig;
use crate::predict::{integrate, predicted_motion};
use crate::report::PositionReport;

/// Outcome of a position check, carrying the numbers a vote is built from.
#[derive(Debug, Clone, Copy)]
pub struct PositionCheck {
    pub is_valid: bool,
    /// Distance between the predicted and the reported position.
    pub position_error: f32,
    /// The slack the error was compared against.
    pub tolerance: f32,
}

impl PositionCheck {
    fn failed_closed() -> Self {
        Self {
            is_valid: false,
            position_error: 0.0,
            tolerance: 0.0,
        }
    }
}

/// Compare a reported position against the physics prediction from the
/// previous report.
///
/// `dt` is the reported interval since the previous report; a non-positive
/// interval fails closed regardless of position. The tolerance widens with
/// the interval (honest integration error accumulates) and with the player's
/// measured latency (a laggy peer reports older truth).
pub fn check_position(
    config: &ConsensusConfig,
    last: &PositionReport,
    reported_position: Vec3,
    timestamp: f64,
    gravity_force: Vec3,
    latency_secs: f64,
) -> PositionCheck {
    let dt = timestamp - last.timestamp;
    if dt <= 0.0 {
        trace!(player = %last.player, dt, "non-positive report interval, failing closed");
        return PositionCheck::failed_closed();
    }
    let (predicted, _) = predicted_motion(last, dt as f32, gravity_force, config.mass());
    let position_error = predicted.distance(reported_position);
    let tolerance = config.base_position_tolerance
        + config.time_decay_rate * dt as f32
        + config.max_speed * latency_secs as f32;
    PositionCheck {
        is_valid: position_error <= tolerance,
        position_error,
        tolerance,
    }
}

/// Compare a reported thrust against the thrust implied by the reported
/// displacement.
///
/// The deviation of the reported position from the gravity-only trajectory
/// over the true interval back-solves to an implied acceleration
/// (`a = 2·Δs/t²`) and hence an implied thrust; the claim must agree with it
/// within the configured slack.
pub fn check_thrust(
    config: &ConsensusConfig,
    last: &PositionReport,
    reported_thrust: Vec3,
    reported_position: Vec3,
    timestamp: f64,
    gravity_force: Vec3,
) -> bool {
    let dt = (timestamp - last.timestamp) as f32;
    if dt <= 0.0 {
        return false;
    }
    let mass = config.mass();
    let (gravity_only, _) = integrate(last.position, last.velocity, gravity_force / mass, dt);
    let deviation = reported_position - gravity_only;
    let implied_acceleration = deviation * (2.0 / (dt * dt));
    let implied_thrust = implied_acceleration * mass;
    let thrust_error = implied_thrust.distance(reported_thrust);
    let tolerance =
        config.base_thrust_tolerance + config.max_thrust_force * config.thrust_tolerance_pct;
    thrust_error <= tolerance
}

/// The farthest a ship could travel in `window` seconds: continuous
/// max-thrust acceleration on top of the current speed.
pub fn max_possible_distance(config: &ConsensusConfig, current_speed: f32, window: f32) -> f32 {
    let acceleration = config.max_thrust_force / config.mass();
    current_speed * window + 0.5 * acceleration * window * window
}

/// The least a ship could travel in `window` seconds: braking from the
/// current speed at max thrust. Gravity is ignored, which only widens the
/// bound (conservative).
pub fn min_possible_distance(config: &ConsensusConfig, current_speed: f32, window: f32) -> f32 {
    let acceleration = config.max_thrust_force / config.mass();
    if acceleration <= 0.0 {
        return current_speed * window;
    }
    let stop_time = current_speed / acceleration;
    if stop_time <= window {
        // comes to rest inside the window
        current_speed * current_speed / (2.0 * acceleration)
    } else {
        current_speed * window - 0.5 * acceleration * window * window
    }
}

/// Whether a summed travel distance is physically plausible for the window.
/// The bounds carry 10% slack in each direction.
pub fn check_travelled_distance(
    config: &ConsensusConfig,
    travelled: f32,
    current_speed: f32,
    window: f32,
) -> bool {
    let min = min_possible_distance(config, current_speed, window) * 0.9;
    let max = max_possible_distance(config, current_speed, window) * 1.1;
    travelled >= min && travelled <= max
}
