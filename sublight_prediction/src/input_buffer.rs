//! Bounded per-entity buffers of raw input payloads.
//!
//! The payload bytes are opaque here: the transport serialized them, the
//! simulation knows how to re-apply them. Keeping the recent window around is
//! what makes input replay after a correction possible.

use bytes::Bytes;
use std::collections::HashMap;
use sublight_core::history_buffer::{DEFAULT_HISTORY_CAPACITY, HistoryBuffer};
use sublight_core::id::EntityId;
use tracing::trace;

/// One captured input: the raw payload and when it was sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    pub payload: Bytes,
    pub timestamp: f64,
}

/// Recent raw inputs per entity, newest-last, bounded FIFO.
#[derive(Debug)]
pub struct InputBuffers {
    buffers: HashMap<EntityId, HistoryBuffer<Bytes>>,
    capacity: usize,
}

impl Default for InputBuffers {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl InputBuffers {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffers: HashMap::new(),
            capacity,
        }
    }

    /// Store an input sample. A sample whose timestamp is not strictly newer
    /// than the last stored one is rejected.
    pub fn store(&mut self, entity: EntityId, payload: Bytes, timestamp: f64) -> bool {
        let buffer = self
            .buffers
            .entry(entity)
            .or_insert_with(|| HistoryBuffer::with_capacity(self.capacity));
        if let Some((last, _)) = buffer.most_recent() {
            if timestamp <= *last {
                trace!(%entity, timestamp, last, "rejecting stale input sample");
                return false;
            }
        }
        buffer.push(timestamp, payload);
        true
    }

    /// Inputs sampled at or after `since`, oldest first.
    // TODO: feed these into a replay pass after a divergence snap once the
    // simulation step function is injectable from the host.
    pub fn records_since(&self, entity: EntityId, since: f64) -> Vec<InputRecord> {
        self.buffers
            .get(&entity)
            .map(|buffer| {
                buffer
                    .iter_since(since)
                    .map(|(timestamp, payload)| InputRecord {
                        payload: payload.clone(),
                        timestamp: *timestamp,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self, entity: EntityId) -> usize {
        self.buffers.get(&entity).map_or(0, |b| b.len())
    }

    /// Drop everything stored for an entity.
    pub fn forget(&mut self, entity: EntityId) {
        self.buffers.remove(&entity);
    }
}
