//! Accessor traits through which the host simulation exposes its world.
//!
//! This core never owns a world object. It stores [`EntityId`]s and receives
//! one of these capabilities per call, so the host stays free to back them
//! with whatever actor/scene representation it uses.

use crate::id::EntityId;
use bevy_math::Vec3;

/// The visible transform and rigid-body handle of one entity.
///
/// Getters read the transform the player sees; setters move it. `apply_force`
/// feeds the underlying rigid body and takes effect on the next physics step,
/// not on the current snapshot.
pub trait PhysicsBody {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);

    /// (pitch, yaw, roll) in radians.
    fn orientation(&self) -> Vec3;
    fn set_orientation(&mut self, orientation: Vec3);

    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);

    fn angular_velocity(&self) -> Vec3;
    fn set_angular_velocity(&mut self, velocity: Vec3);

    fn apply_force(&mut self, force: Vec3);

    /// Whether the rigid body is currently simulating. Defaults to true for
    /// hosts that never suspend simulation.
    fn is_simulating_physics(&self) -> bool {
        true
    }
}

/// Resolves an [`EntityId`] to its body for the duration of one call.
///
/// Returning `None` for an id that was despawned mid-frame is normal; every
/// caller treats it as a no-op.
pub trait BodyRegistry {
    fn body_mut(&mut self, entity: EntityId) -> Option<&mut dyn PhysicsBody>;
}
