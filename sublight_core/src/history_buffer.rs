//! A bounded buffer of past values keyed by session time.
//!
//! Used for the per-entity state history (lag compensation, reconciliation
//! bookkeeping) and the per-player report history on the consensus side.

use std::collections::VecDeque;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Default number of samples retained per key.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Stores past values ordered from oldest (front) to most recent (back).
///
/// The buffer is bounded: pushing onto a full buffer evicts the oldest entry.
/// Keys are session timestamps in seconds and must arrive in non-decreasing
/// order; a push that would break the ordering is dropped, since staleness is
/// decided (and logged) by the caller before the value gets here.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<V> {
    buffer: VecDeque<(f64, V)>,
    capacity: usize,
}

impl<V> Default for HistoryBuffer<V> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<V> HistoryBuffer<V> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest retained sample.
    pub fn oldest(&self) -> Option<&(f64, V)> {
        self.buffer.front()
    }

    /// Most recent sample.
    pub fn most_recent(&self) -> Option<&(f64, V)> {
        self.buffer.back()
    }

    /// Append a sample, evicting the oldest one if the buffer is full.
    ///
    /// A sample with the same timestamp as the most recent one replaces it.
    pub fn push(&mut self, timestamp: f64, value: V) {
        if let Some((last, _)) = self.buffer.back() {
            if *last == timestamp {
                // replace rather than storing two samples for one instant
                self.buffer.pop_back();
            } else if *last > timestamp {
                debug!(last, timestamp, "dropping out-of-order history sample");
                return;
            }
        }
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back((timestamp, value));
    }

    /// Most recent value at or before `timestamp`.
    pub fn at_or_before(&self, timestamp: f64) -> Option<&V> {
        // first index where buffer_timestamp > timestamp
        let partition = self.buffer.partition_point(|(t, _)| *t <= timestamp);
        if partition == 0 {
            return None;
        }
        self.buffer.get(partition - 1).map(|(_, v)| v)
    }

    /// The sample whose timestamp is closest to `timestamp` (minimum absolute
    /// difference). Does not interpolate between neighbors.
    pub fn closest(&self, timestamp: f64) -> Option<&(f64, V)> {
        let partition = self.buffer.partition_point(|(t, _)| *t <= timestamp);
        let before = partition.checked_sub(1).and_then(|i| self.buffer.get(i));
        let after = self.buffer.get(partition);
        match (before, after) {
            (Some(b), Some(a)) => {
                if (timestamp - b.0).abs() <= (a.0 - timestamp).abs() {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (Some(b), None) => Some(b),
            (None, Some(a)) => Some(a),
            (None, None) => None,
        }
    }

    /// Remove every sample strictly older than `cutoff`.
    pub fn clear_older_than(&mut self, cutoff: f64) {
        let partition = self.buffer.partition_point(|(t, _)| *t < cutoff);
        self.buffer.drain(0..partition);
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Samples from oldest to most recent.
    pub fn iter(&self) -> impl Iterator<Item = &(f64, V)> {
        self.buffer.iter()
    }

    /// Samples with `timestamp >= since`, oldest first.
    pub fn iter_since(&self, since: f64) -> impl Iterator<Item = &(f64, V)> {
        let partition = self.buffer.partition_point(|(t, _)| *t < since);
        self.buffer.iter().skip(partition)
    }
}
