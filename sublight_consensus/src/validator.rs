//! The [`ConsensusValidator`]: report history, checks, votes and trust in
//! one single-owner instance.

use bevy_math::Vec3;
use std::collections::HashMap;
use sublight_core::events::Observers;
use sublight_core::history_buffer::HistoryBuffer;
use sublight_core::id::PlayerId;
use tracing::{debug, trace, warn};

use crate::config::ConsensusConfig;
use crate::environment::{GravityProvider, LatencyProvider};
use crate::predict::predicted_motion;
use crate::report::PositionReport;
use crate::trust::{TrustChangedEvent, TrustState, TrustTracker};
use crate::validate::{self, PositionCheck};
use crate::voting::{ConsensusResult, ValidationVote, VoteTable};

/// One validator node's view of the anti-cheat pipeline.
///
/// Owns the per-player report histories, the vote table and the trust
/// records; gravity and latency lookups are capabilities passed into each
/// call, so the validator never holds a reference into the host's world.
pub struct ConsensusValidator {
    config: ConsensusConfig,
    reports: HashMap<PlayerId, HistoryBuffer<PositionReport>>,
    votes: VoteTable,
    trust: TrustTracker,
    trust_observers: Observers<TrustChangedEvent>,
    consensus_observers: Observers<ConsensusResult>,
}

impl Default for ConsensusValidator {
    fn default() -> Self {
        Self::new(ConsensusConfig::default())
    }
}

impl ConsensusValidator {
    pub fn new(config: ConsensusConfig) -> Self {
        Self {
            config,
            reports: HashMap::new(),
            votes: VoteTable::default(),
            trust: TrustTracker::default(),
            trust_observers: Observers::default(),
            consensus_observers: Observers::default(),
        }
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Start tracking a player: an empty report history and a Trusted record.
    pub fn register_player(&mut self, player: PlayerId) -> bool {
        if !self.trust.register(player) {
            trace!(%player, "player already registered");
            return false;
        }
        self.reports
            .insert(player, HistoryBuffer::with_capacity(self.config.report_capacity));
        true
    }

    /// Remove a player from every subordinate map: reports, vote buckets and
    /// the trust record go together.
    pub fn unregister_player(&mut self, player: PlayerId) -> bool {
        let was_known = self.trust.unregister(player);
        self.reports.remove(&player);
        self.votes.forget_target(player);
        was_known
    }

    pub fn is_registered(&self, player: PlayerId) -> bool {
        self.trust.state(player).is_some()
    }

    /// Ingest a self-reported motion sample.
    ///
    /// A report for an unknown player, or one whose timestamp/sequence does
    /// not advance strictly past the previous report, is rejected without
    /// mutating anything.
    pub fn add_report(&mut self, report: PositionReport) -> bool {
        let Some(history) = self.reports.get_mut(&report.player) else {
            return false;
        };
        if let Some((_, last)) = history.most_recent() {
            if report.timestamp <= last.timestamp || report.sequence <= last.sequence {
                trace!(
                    player = %report.player,
                    sequence = report.sequence,
                    last = last.sequence,
                    "rejecting stale position report"
                );
                #[cfg(feature = "metrics")]
                metrics::counter!("consensus::reports::stale").increment(1);
                return false;
            }
        }
        history.push(report.timestamp, report);
        true
    }

    /// The most recent accepted report for a player.
    pub fn last_report(&self, player: PlayerId) -> Option<PositionReport> {
        self.reports
            .get(&player)
            .and_then(|history| history.most_recent())
            .map(|(_, report)| *report)
    }

    /// Where physics says the player should be `dt` seconds after their last
    /// report. Pure; returns `(position, velocity)`, or `None` without a
    /// report to predict from.
    pub fn predict_position(
        &self,
        player: PlayerId,
        dt: f32,
        gravity: &dyn GravityProvider,
    ) -> Option<(Vec3, Vec3)> {
        let last = self.last_report(player)?;
        let gravity_force = gravity.gravity_force(last.position);
        Some(predicted_motion(&last, dt, gravity_force, self.config.mass()))
    }

    /// Check a reported position against the prediction from the last
    /// accepted report. Fails closed without a previous report or when the
    /// reported interval is not positive.
    pub fn validate_position(
        &self,
        player: PlayerId,
        reported_position: Vec3,
        timestamp: f64,
        gravity: &dyn GravityProvider,
        latency: &dyn LatencyProvider,
    ) -> PositionCheck {
        let Some(last) = self.last_report(player) else {
            trace!(%player, "no report history, failing position check closed");
            return PositionCheck {
                is_valid: false,
                position_error: 0.0,
                tolerance: 0.0,
            };
        };
        let latency_secs = latency
            .latency_secs(player)
            .unwrap_or_else(|| self.config.default_latency.as_secs_f64());
        let gravity_force = gravity.gravity_force(last.position);
        validate::check_position(
            &self.config,
            &last,
            reported_position,
            timestamp,
            gravity_force,
            latency_secs,
        )
    }

    /// Check a reported thrust against the thrust implied by the reported
    /// displacement over the true interval since the last report.
    pub fn validate_thrust(
        &self,
        player: PlayerId,
        reported_thrust: Vec3,
        reported_position: Vec3,
        timestamp: f64,
        gravity: &dyn GravityProvider,
    ) -> bool {
        let Some(last) = self.last_report(player) else {
            return false;
        };
        let gravity_force = gravity.gravity_force(last.position);
        validate::check_thrust(
            &self.config,
            &last,
            reported_thrust,
            reported_position,
            timestamp,
            gravity_force,
        )
    }

    /// Check that the distance travelled across the reports inside `window`
    /// (anchored at the newest report) is physically reachable.
    ///
    /// With fewer than two reports in the window there is no travelled
    /// distance to judge, and the check passes.
    pub fn validate_distance_over_time(&self, player: PlayerId, window: f64) -> bool {
        let Some(history) = self.reports.get(&player) else {
            return false;
        };
        let Some((anchor, last)) = history.most_recent().map(|(t, r)| (*t, *r)) else {
            return true;
        };
        let mut travelled = 0.0f32;
        let mut samples = 0usize;
        let mut previous: Option<Vec3> = None;
        for (_, report) in history.iter_since(anchor - window) {
            if let Some(previous) = previous {
                travelled += previous.distance(report.position);
            }
            previous = Some(report.position);
            samples += 1;
        }
        if samples < 2 {
            trace!(%player, "not enough reports in window to judge distance");
            return true;
        }
        validate::check_travelled_distance(
            &self.config,
            travelled,
            last.velocity.length(),
            window as f32,
        )
    }

    /// Record one validator's verdict. Duplicate votes (same validator, same
    /// report) and votes for unknown players are rejected.
    pub fn submit_vote(&mut self, vote: ValidationVote) -> bool {
        if !self.is_registered(vote.target) {
            return false;
        }
        self.votes.submit(vote)
    }

    /// Tally the votes for one report. Emits the result to consensus
    /// observers when a supermajority was reached in either direction.
    pub fn calculate_consensus(&mut self, player: PlayerId, sequence: u64) -> ConsensusResult {
        let result = self
            .votes
            .tally(player, sequence, self.config.consensus_threshold);
        if result.consensus_reached {
            debug!(
                %player,
                sequence,
                valid = result.valid_votes,
                invalid = result.invalid_votes,
                "consensus reached"
            );
            self.consensus_observers.emit(&result);
        }
        result
    }

    /// Fold a validation outcome into the player's trust standing.
    pub fn update_validation_state(
        &mut self,
        player: PlayerId,
        passed: bool,
        now: f64,
    ) -> Option<TrustState> {
        let (previous, current) = self.trust.record_outcome(player, passed, now, &self.config)?;
        if previous != current {
            if current == TrustState::Kicked {
                warn!(%player, "player crossed the kick threshold");
                #[cfg(feature = "metrics")]
                metrics::counter!("consensus::trust::kicks").increment(1);
            }
            self.trust_observers.emit(&TrustChangedEvent {
                player,
                previous,
                current,
            });
        }
        Some(current)
    }

    pub fn validation_state(&self, player: PlayerId) -> Option<TrustState> {
        self.trust.state(player)
    }

    /// Advisory predicate; the session manager decides what to do with it.
    pub fn should_kick_player(&self, player: PlayerId) -> bool {
        self.trust.should_kick(player)
    }

    /// Restore a player to Trusted, clearing a Kicked state.
    pub fn reset_validation_state(&mut self, player: PlayerId) -> bool {
        let Some((previous, current)) = self.trust.reset(player) else {
            return false;
        };
        if previous != current {
            self.trust_observers.emit(&TrustChangedEvent {
                player,
                previous,
                current,
            });
        }
        true
    }

    /// Subscribe to trust-state transitions.
    pub fn on_trust_changed(&mut self, observer: impl FnMut(&TrustChangedEvent) + 'static) {
        self.trust_observers.subscribe(observer);
    }

    /// Subscribe to reached consensus results.
    pub fn on_consensus(&mut self, observer: impl FnMut(&ConsensusResult) + 'static) {
        self.consensus_observers.subscribe(observer);
    }
}

impl core::fmt::Debug for ConsensusValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConsensusValidator")
            .field("players", &self.reports.len())
            .finish()
    }
}
