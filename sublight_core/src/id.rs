//! Stable identifiers used to address entities and players across the crates.
//!
//! The transport layer assigns these; this core only ever stores and compares
//! them. Holding an id never keeps a world object alive.

use core::fmt::Formatter;
use serde::{Deserialize, Serialize};

/// Identifies a replicated entity (a ship) for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Identifies a connected player for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

/// Identifies a peer acting as an independent validator in the consensus
/// pipeline. Validators are ordinary peers; the separate type keeps vote
/// bookkeeping from mixing up who voted with who was voted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValidatorId(pub u64);

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl core::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "Player({})", self.0)
    }
}

impl core::fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "Validator({})", self.0)
    }
}
