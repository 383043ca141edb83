/*! # Sublight Interpolation

Produces a visually smooth transform for Simulated (remote) entities: blending
toward a freshly received authoritative state when one is available, and
projecting the last known state forward when updates run late.

Both paths write only the entity's visible transform. The registry's
authoritative current state and history are never touched from here, so a
smoothed frame can never contaminate reconciliation or lag compensation.
*/

pub mod extrapolate;
pub mod interpolate;

pub mod prelude {
    pub use crate::extrapolate::extrapolate;
    pub use crate::interpolate::{InterpolationConfig, InterpolationSession, Interpolator};
}
