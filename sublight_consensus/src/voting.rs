//! Vote aggregation per `(target player, report sequence)`.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use sublight_core::id::{PlayerId, ValidatorId};
use tracing::trace;

/// One validator's verdict on one report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationVote {
    pub validator: ValidatorId,
    pub target: PlayerId,
    pub sequence: u64,
    pub is_valid: bool,
    /// The position error the validator measured, for diagnostics and the
    /// consensus average.
    pub position_error: f32,
}

/// The tally for one report, derived on demand and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub player: PlayerId,
    pub sequence: u64,
    pub valid_votes: u32,
    pub invalid_votes: u32,
    pub average_position_error: f32,
    /// True when the valid fraction is at or beyond the supermajority
    /// threshold in either direction: a confident "invalid" counts as much
    /// as a confident "valid".
    pub consensus_reached: bool,
}

/// Votes bucketed by `(target, sequence)`.
#[derive(Debug, Default)]
pub struct VoteTable {
    votes: HashMap<(PlayerId, u64), Vec<ValidationVote>>,
}

impl VoteTable {
    /// Record a vote. Each validator gets one vote per report; a second vote
    /// from the same validator for the same bucket is rejected.
    pub fn submit(&mut self, vote: ValidationVote) -> bool {
        let bucket = self.votes.entry((vote.target, vote.sequence)).or_default();
        if bucket.iter().any(|v| v.validator == vote.validator) {
            trace!(
                validator = %vote.validator,
                target = %vote.target,
                sequence = vote.sequence,
                "duplicate vote rejected"
            );
            return false;
        }
        bucket.push(vote);
        true
    }

    /// Tally the bucket for one report.
    ///
    /// Threshold semantics are `>=` on both sides: with the default 0.67,
    /// 2 valid of 3 (~0.667) does not reach consensus, 7 of 10 does, and
    /// 1 of 10 reaches a confident-invalid consensus.
    pub fn tally(&self, player: PlayerId, sequence: u64, threshold: f32) -> ConsensusResult {
        let bucket = self.votes.get(&(player, sequence));
        let (mut valid_votes, mut invalid_votes) = (0u32, 0u32);
        let mut error_sum = 0.0f32;
        if let Some(bucket) = bucket {
            for vote in bucket {
                if vote.is_valid {
                    valid_votes += 1;
                } else {
                    invalid_votes += 1;
                }
                error_sum += vote.position_error;
            }
        }
        let total = valid_votes + invalid_votes;
        let (average_position_error, consensus_reached) = if total == 0 {
            (0.0, false)
        } else {
            let valid_fraction = valid_votes as f32 / total as f32;
            (
                error_sum / total as f32,
                valid_fraction >= threshold || valid_fraction <= 1.0 - threshold,
            )
        };
        ConsensusResult {
            player,
            sequence,
            valid_votes,
            invalid_votes,
            average_position_error,
            consensus_reached,
        }
    }

    /// Drop every bucket for a target player.
    pub fn forget_target(&mut self, player: PlayerId) {
        self.votes.retain(|(target, _), _| *target != player);
    }

    pub fn bucket_len(&self, player: PlayerId, sequence: u64) -> usize {
        self.votes
            .get(&(player, sequence))
            .map_or(0, |bucket| bucket.len())
    }
}
