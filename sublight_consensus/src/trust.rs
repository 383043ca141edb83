//! The per-player trust-state machine.
//!
//! Standing escalates on validation failures and recovers on success or
//! quiet time:
//!
//! - a failure moves a player to Suspect, then Flagged at `flag_threshold`
//!   consecutive failures, then Kicked at `kick_threshold`;
//! - a success while Suspect resets the counter and restores Trusted;
//! - a failure burst must fit inside `kick_time_window`: once the window
//!   since the first recorded failure lapses the counter starts over, and a
//!   Suspect with a lapsed window reverts to Trusted (isolated failures are
//!   forgiven);
//! - Kicked is terminal until an explicit reset. Flagged is sticky: success
//!   alone does not clear it, only the window lapse or a reset does the
//!   counter — the flag itself stays for the session manager to inspect.
//!
//! Everything here is advisory. Disconnecting a player is the session
//! manager's decision; this module only answers `should_kick`.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use sublight_core::id::PlayerId;

use crate::config::ConsensusConfig;

/// A player's accumulated anti-cheat standing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrustState {
    #[default]
    Trusted,
    Suspect,
    Flagged,
    Kicked,
}

/// Emitted synchronously whenever a player's standing changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustChangedEvent {
    pub player: PlayerId,
    pub previous: TrustState,
    pub current: TrustState,
}

#[derive(Debug, Clone, Copy)]
struct TrustRecord {
    state: TrustState,
    failures: u32,
    first_failure: Option<f64>,
}

impl Default for TrustRecord {
    fn default() -> Self {
        Self {
            state: TrustState::Trusted,
            failures: 0,
            first_failure: None,
        }
    }
}

/// Owns every player's trust record.
#[derive(Debug, Default)]
pub struct TrustTracker {
    records: HashMap<PlayerId, TrustRecord>,
}

impl TrustTracker {
    /// Create a Trusted record for a new player. No-op if one exists.
    pub fn register(&mut self, player: PlayerId) -> bool {
        if self.records.contains_key(&player) {
            return false;
        }
        self.records.insert(player, TrustRecord::default());
        true
    }

    pub fn unregister(&mut self, player: PlayerId) -> bool {
        self.records.remove(&player).is_some()
    }

    pub fn state(&self, player: PlayerId) -> Option<TrustState> {
        self.records.get(&player).map(|r| r.state)
    }

    pub fn failures(&self, player: PlayerId) -> u32 {
        self.records.get(&player).map_or(0, |r| r.failures)
    }

    pub fn should_kick(&self, player: PlayerId) -> bool {
        self.state(player) == Some(TrustState::Kicked)
    }

    /// Fold one validation outcome into the player's standing.
    ///
    /// Returns `(previous, current)` state, or `None` for an unregistered
    /// player (no-op).
    pub fn record_outcome(
        &mut self,
        player: PlayerId,
        passed: bool,
        now: f64,
        config: &ConsensusConfig,
    ) -> Option<(TrustState, TrustState)> {
        let record = self.records.get_mut(&player)?;
        let previous = record.state;
        if previous == TrustState::Kicked {
            return Some((previous, previous));
        }

        // a lapsed failure window forgives the accumulated count
        if let Some(first) = record.first_failure {
            if now - first > config.kick_time_window.as_secs_f64() {
                record.failures = 0;
                record.first_failure = None;
                if record.state == TrustState::Suspect {
                    record.state = TrustState::Trusted;
                }
            }
        }

        if passed {
            if record.state == TrustState::Suspect {
                record.failures = 0;
                record.first_failure = None;
                record.state = TrustState::Trusted;
            }
        } else {
            if record.first_failure.is_none() {
                record.first_failure = Some(now);
            }
            record.failures += 1;
            record.state = if record.failures >= config.kick_threshold {
                TrustState::Kicked
            } else if record.failures >= config.flag_threshold {
                TrustState::Flagged
            } else {
                TrustState::Suspect
            };
        }
        Some((previous, record.state))
    }

    /// Explicitly restore a player to Trusted, clearing Kicked.
    ///
    /// Returns `(previous, current)`, or `None` for an unregistered player.
    pub fn reset(&mut self, player: PlayerId) -> Option<(TrustState, TrustState)> {
        let record = self.records.get_mut(&player)?;
        let previous = record.state;
        *record = TrustRecord::default();
        Some((previous, record.state))
    }
}
