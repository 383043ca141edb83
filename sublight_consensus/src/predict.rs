//! Physics-based trajectory prediction.
//!
//! Validators re-predict each report from the previous one with the same
//! constant-acceleration kinematics the simulation itself uses. Everything
//! here is pure: same inputs, same answer, on every validator.

use bevy_math::Vec3;

use crate::report::PositionReport;

/// Constant-acceleration step: `v' = v + a·dt`, `p' = p + v·dt + a·dt²/2`.
pub fn integrate(position: Vec3, velocity: Vec3, acceleration: Vec3, dt: f32) -> (Vec3, Vec3) {
    let next_velocity = velocity + acceleration * dt;
    let next_position = position + velocity * dt + acceleration * (0.5 * dt * dt);
    (next_position, next_velocity)
}

/// Where a report says the ship should be `dt` seconds later, given the
/// gravity force at the reported position and the reported thrust.
///
/// Returns `(position, velocity)`.
pub fn predicted_motion(
    report: &PositionReport,
    dt: f32,
    gravity_force: Vec3,
    mass: f32,
) -> (Vec3, Vec3) {
    let mass = mass.max(1.0);
    let acceleration = gravity_force / mass + report.thrust / mass;
    integrate(report.position, report.velocity, acceleration, dt)
}
