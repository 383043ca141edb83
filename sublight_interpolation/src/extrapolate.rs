//! Clamped forward projection for proxies whose updates run late.

use std::time::Duration;
use sublight_core::state::{PhysicsState, advance_orientation};

/// Project `state` forward by `future_dt` seconds using its own velocities.
///
/// Pure read: the input state is not mutated and nothing is recorded. The
/// projection interval is clamped to `max_extrapolation`, so a proxy that has
/// been silent for a long time freezes a bounded distance ahead of its last
/// known state instead of sailing off forever.
pub fn extrapolate(
    state: &PhysicsState,
    future_dt: f32,
    max_extrapolation: Duration,
) -> PhysicsState {
    let dt = future_dt.clamp(0.0, max_extrapolation.as_secs_f32());
    PhysicsState {
        position: state.position + state.linear_velocity * dt,
        orientation: advance_orientation(state.orientation, state.angular_velocity, dt),
        timestamp: state.timestamp + dt as f64,
        ..*state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bevy_math::Vec3;
    use test_log::test;

    #[test]
    fn projection_is_clamped() {
        let state = PhysicsState {
            linear_velocity: Vec3::new(5.0, 0.0, 0.0),
            ..Default::default()
        };
        let projected = extrapolate(&state, 1.0, Duration::from_millis(200));
        // clamped to 0.2s of travel, not a full second
        assert_relative_eq!(projected.position.x, 1.0);
        assert_relative_eq!(projected.position.y, 0.0);
        assert_relative_eq!(projected.position.z, 0.0);
    }

    #[test]
    fn negative_lead_time_projects_nothing() {
        let state = PhysicsState {
            linear_velocity: Vec3::X * 10.0,
            ..Default::default()
        };
        let projected = extrapolate(&state, -0.5, Duration::from_millis(200));
        assert_eq!(projected.position, state.position);
    }

    #[test]
    fn orientation_follows_the_axis_convention() {
        let state = PhysicsState {
            angular_velocity: Vec3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };
        let projected = extrapolate(&state, 0.1, Duration::from_secs(1));
        // pitch from Y, yaw from Z, roll from X
        assert_relative_eq!(projected.orientation.x, 0.2);
        assert_relative_eq!(projected.orientation.y, 0.3);
        assert_relative_eq!(projected.orientation.z, 0.1);
    }
}
