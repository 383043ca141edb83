//! The [`PhysicsStateRegistry`]: per-entity mode, current state and history.
//!
//! One registry instance exists per process (server or client) and is the
//! single owner of this map; prediction, interpolation and lag compensation
//! borrow it per call. Every operation on an unregistered id is a no-op that
//! returns `false`/`None` — never an error.

use crate::body::PhysicsBody;
use crate::history_buffer::{DEFAULT_HISTORY_CAPACITY, HistoryBuffer};
use crate::id::EntityId;
use crate::state::{PhysicsMode, PhysicsState};
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug)]
struct EntityEntry {
    mode: PhysicsMode,
    prediction_enabled: bool,
    current: Option<PhysicsState>,
    history: HistoryBuffer<PhysicsState>,
}

/// Owns the synchronization state of every registered entity.
#[derive(Debug)]
pub struct PhysicsStateRegistry {
    entities: HashMap<EntityId, EntityEntry>,
    history_capacity: usize,
}

impl Default for PhysicsStateRegistry {
    fn default() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl PhysicsStateRegistry {
    pub fn with_history_capacity(history_capacity: usize) -> Self {
        Self {
            entities: HashMap::new(),
            history_capacity,
        }
    }

    /// Register an entity under the given mode. Registering an id twice is a
    /// no-op that keeps the original registration.
    pub fn register(&mut self, entity: EntityId, mode: PhysicsMode) -> bool {
        if self.entities.contains_key(&entity) {
            trace!(%entity, "entity already registered");
            return false;
        }
        self.entities.insert(
            entity,
            EntityEntry {
                mode,
                prediction_enabled: false,
                current: None,
                history: HistoryBuffer::with_capacity(self.history_capacity),
            },
        );
        true
    }

    /// Remove an entity and everything the registry holds for it.
    pub fn unregister(&mut self, entity: EntityId) -> bool {
        self.entities.remove(&entity).is_some()
    }

    pub fn is_registered(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn mode(&self, entity: EntityId) -> Option<PhysicsMode> {
        self.entities.get(&entity).map(|e| e.mode)
    }

    pub fn set_mode(&mut self, entity: EntityId, mode: PhysicsMode) -> bool {
        match self.entities.get_mut(&entity) {
            Some(entry) => {
                entry.mode = mode;
                true
            }
            None => false,
        }
    }

    pub fn prediction_enabled(&self, entity: EntityId) -> bool {
        self.entities
            .get(&entity)
            .is_some_and(|e| e.prediction_enabled)
    }

    pub fn enable_prediction(&mut self, entity: EntityId, enabled: bool) -> bool {
        match self.entities.get_mut(&entity) {
            Some(entry) => {
                entry.prediction_enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Latest recorded state, if any state has been recorded yet.
    pub fn state(&self, entity: EntityId) -> Option<&PhysicsState> {
        self.entities.get(&entity).and_then(|e| e.current.as_ref())
    }

    /// The sequence number the next snapshot for this entity should carry.
    pub fn next_sequence(&self, entity: EntityId) -> u64 {
        self.state(entity).map_or(0, |s| s.sequence + 1)
    }

    /// Record a snapshot as the current state and append it to the history.
    pub fn set_state(&mut self, entity: EntityId, state: PhysicsState) -> bool {
        match self.entities.get_mut(&entity) {
            Some(entry) => {
                entry.history.push(state.timestamp, state);
                entry.current = Some(state);
                true
            }
            None => false,
        }
    }

    /// Record a snapshot and push it onto the entity's visible transform.
    pub fn apply_state(
        &mut self,
        entity: EntityId,
        state: PhysicsState,
        body: &mut dyn PhysicsBody,
    ) -> bool {
        if !self.set_state(entity, state) {
            return false;
        }
        state.apply_to(body);
        true
    }

    pub fn history(&self, entity: EntityId) -> Option<&HistoryBuffer<PhysicsState>> {
        self.entities.get(&entity).map(|e| &e.history)
    }

    /// Ids of every entity currently in `mode`. Collected so callers can
    /// mutate the registry while walking the result.
    pub fn ids_in_mode(&self, mode: PhysicsMode) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.mode == mode)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Drop history samples older than `cutoff` across all entities.
    pub fn sweep_history(&mut self, cutoff: f64) {
        for entry in self.entities.values_mut() {
            entry.history.clear_older_than(cutoff);
        }
    }
}
