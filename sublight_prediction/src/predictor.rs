//! Dead-reckoning prediction for locally-owned entities.

use bytes::Bytes;
use sublight_core::body::PhysicsBody;
use sublight_core::id::EntityId;
use sublight_core::registry::PhysicsStateRegistry;
use sublight_core::state::{PhysicsState, advance_orientation};
use tracing::trace;

use crate::input_buffer::{InputBuffers, InputRecord};

/// Advances Autonomous entities every frame, ahead of server confirmation.
///
/// Prediction is a pure integration of the last recorded state: position by
/// linear velocity, orientation by angular velocity. Velocities carry over
/// unchanged; thrust is applied by the simulation itself before the next
/// snapshot is captured.
#[derive(Debug, Default)]
pub struct ClientPredictor {
    inputs: InputBuffers,
}

impl ClientPredictor {
    pub fn with_input_capacity(capacity: usize) -> Self {
        Self {
            inputs: InputBuffers::with_capacity(capacity),
        }
    }

    /// Advance one entity by `dt` seconds, stamping `now` and the next
    /// sequence number, and record the result as current state + history.
    ///
    /// No-op unless the entity is registered, prediction-enabled and has a
    /// recorded state to advance from.
    pub fn predict(
        &self,
        registry: &mut PhysicsStateRegistry,
        body: &mut dyn PhysicsBody,
        entity: EntityId,
        dt: f32,
        now: f64,
    ) -> bool {
        if !registry.prediction_enabled(entity) {
            return false;
        }
        let Some(current) = registry.state(entity) else {
            trace!(%entity, "no recorded state to predict from");
            return false;
        };

        let predicted = PhysicsState {
            position: current.position + current.linear_velocity * dt,
            orientation: advance_orientation(
                current.orientation,
                current.angular_velocity,
                dt,
            ),
            linear_velocity: current.linear_velocity,
            angular_velocity: current.angular_velocity,
            timestamp: now,
            sequence: registry.next_sequence(entity),
            simulating_physics: current.simulating_physics,
        };
        registry.apply_state(entity, predicted, body)
    }

    /// Buffer a raw input sample for later replay. Stale samples (timestamp
    /// not strictly newer than the last stored) are rejected.
    pub fn store_input(&mut self, entity: EntityId, payload: Bytes, timestamp: f64) -> bool {
        self.inputs.store(entity, payload, timestamp)
    }

    /// Buffered inputs sampled at or after `since`, oldest first.
    pub fn inputs_since(&self, entity: EntityId, since: f64) -> Vec<InputRecord> {
        self.inputs.records_since(entity, since)
    }

    /// Drop everything buffered for an entity.
    pub fn forget(&mut self, entity: EntityId) {
        self.inputs.forget(entity);
    }
}
