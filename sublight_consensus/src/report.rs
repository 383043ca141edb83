//! The per-report sample clients submit for validation.

use bevy_math::Vec3;
use serde::{Deserialize, Serialize};
use sublight_core::id::PlayerId;

/// One self-reported motion sample.
///
/// Identity is `(player, sequence)`; sequence numbers strictly increase per
/// player within a session, and a report that does not advance both the
/// sequence and the timestamp past the previous one is rejected on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub player: PlayerId,
    pub position: Vec3,
    pub velocity: Vec3,
    /// The thrust the client claims to have been applying, in newtons.
    pub thrust: Vec3,
    /// Session time in seconds at which the sample was taken.
    pub timestamp: f64,
    pub sequence: u64,
}
