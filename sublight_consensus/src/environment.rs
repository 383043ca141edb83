//! Environment capabilities the host passes into validation calls.

use bevy_math::Vec3;
use sublight_core::id::PlayerId;

/// Answers "what gravitational force acts at this location".
///
/// Backed by the orbital-gravity subsystem on real hosts. Validation only
/// samples it at reported positions; it never integrates orbits itself.
pub trait GravityProvider {
    fn gravity_force(&self, position: Vec3) -> Vec3;
}

/// Force-free space. Useful for tests and deep-space sectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGravity;

impl GravityProvider for NoGravity {
    fn gravity_force(&self, _position: Vec3) -> Vec3 {
        Vec3::ZERO
    }
}

/// Answers "what is this player's network latency", in seconds.
///
/// `None` means the host has no measurement yet; validation then assumes the
/// configured default.
pub trait LatencyProvider {
    fn latency_secs(&self, player: PlayerId) -> Option<f64>;
}

/// A host with no latency measurements at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownLatency;

impl LatencyProvider for UnknownLatency {
    fn latency_secs(&self, _player: PlayerId) -> Option<f64> {
        None
    }
}
