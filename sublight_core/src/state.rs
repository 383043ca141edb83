//! The [`PhysicsState`] snapshot and the per-entity [`PhysicsMode`].

use crate::body::PhysicsBody;
use bevy_math::Vec3;
use serde::{Deserialize, Serialize};

/// Which algorithm drives an entity's per-frame updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicsMode {
    /// Server-owned ground truth: state is pulled from the simulation every
    /// frame and recorded as the authoritative history.
    Authority,
    /// Locally-owned on a client: advanced by dead-reckoning prediction until
    /// the authoritative state arrives and reconciliation corrects it.
    #[default]
    Autonomous,
    /// A remote proxy on a client: driven by interpolation toward received
    /// states, or extrapolation when updates run late.
    Simulated,
}

/// An immutable snapshot of one entity's motion at one instant.
///
/// Identity is `(entity, sequence)`: sequence numbers strictly increase per
/// entity within a session, so two snapshots with the same sequence for the
/// same entity describe the same instant.
///
/// Orientation is a pitch/yaw/roll triple in radians, matching what the
/// transport layer carries. It is interpolated component-wise; conversion to
/// a rotation representation happens on the rendering side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicsState {
    pub position: Vec3,
    /// (pitch, yaw, roll) in radians.
    pub orientation: Vec3,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Session time in seconds at which this snapshot was taken.
    pub timestamp: f64,
    /// Strictly increasing per entity.
    pub sequence: u64,
    /// Whether the entity was simulating rigid-body physics when captured.
    pub simulating_physics: bool,
}

impl PhysicsState {
    /// Snapshot the visible transform of a body.
    pub fn capture(body: &dyn PhysicsBody, timestamp: f64, sequence: u64) -> Self {
        Self {
            position: body.position(),
            orientation: body.orientation(),
            linear_velocity: body.linear_velocity(),
            angular_velocity: body.angular_velocity(),
            timestamp,
            sequence,
            simulating_physics: body.is_simulating_physics(),
        }
    }

    /// Push this snapshot onto a body's visible transform.
    pub fn apply_to(&self, body: &mut dyn PhysicsBody) {
        body.set_position(self.position);
        body.set_orientation(self.orientation);
        body.set_linear_velocity(self.linear_velocity);
        body.set_angular_velocity(self.angular_velocity);
    }

    /// Euclidean distance between this snapshot's position and another's.
    pub fn position_error(&self, other: &Self) -> f32 {
        self.position.distance(other.position)
    }
}

/// Advance a (pitch, yaw, roll) triple by an angular velocity over `dt`.
///
/// The transport's axis convention: pitch is driven by the angular velocity's
/// Y component, yaw by Z, roll by X. Both prediction and extrapolation must
/// integrate with the same mapping or remote and local views of a spin drift
/// apart.
pub fn advance_orientation(orientation: Vec3, angular_velocity: Vec3, dt: f32) -> Vec3 {
    Vec3::new(
        orientation.x + angular_velocity.y * dt,
        orientation.y + angular_velocity.z * dt,
        orientation.z + angular_velocity.x * dt,
    )
}
