/*! # Sublight Lag Compensation

Answers "where did this entity appear to be at past time T" from the recorded
state history, so the server can judge interactions from the attacker's
perspective instead of the present one.

Server only: clients never hold enough authoritative history for the answer
to mean anything.

Semantics are deliberately single-nearest-sample: the query returns the
recorded snapshot whose timestamp is closest to the requested instant, with
no blending between neighbors. At the capture rates this runs at, a blended
sample buys sub-frame precision the interaction checks cannot use, at the
cost of fabricating states that never existed.
*/

use std::time::Duration;
use sublight_core::id::EntityId;
use sublight_core::registry::PhysicsStateRegistry;
use sublight_core::state::PhysicsState;
use tracing::trace;

#[derive(Debug, Clone, Copy)]
pub struct LagCompensationConfig {
    /// History older than this is unusable for fairness checks and is swept.
    pub max_age: Duration,
    /// How often the sweep runs.
    pub cleanup_interval: Duration,
}

impl Default for LagCompensationConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(2),
            cleanup_interval: Duration::from_secs(10),
        }
    }
}

impl LagCompensationConfig {
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_cleanup_interval(mut self, cleanup_interval: Duration) -> Self {
        self.cleanup_interval = cleanup_interval;
        self
    }
}

/// Rewinds entities through the registry's recorded history.
#[derive(Debug)]
pub struct LagCompensator {
    config: LagCompensationConfig,
    last_cleanup: Option<f64>,
}

impl Default for LagCompensator {
    fn default() -> Self {
        Self::new(LagCompensationConfig::default())
    }
}

impl LagCompensator {
    pub fn new(config: LagCompensationConfig) -> Self {
        Self {
            config,
            last_cleanup: None,
        }
    }

    pub fn config(&self) -> &LagCompensationConfig {
        &self.config
    }

    /// The recorded snapshot closest to `past_timestamp`.
    ///
    /// Falls back to the current state when the entity has no history, and
    /// `None` when the entity is unregistered or has no state at all.
    pub fn historical_state(
        &self,
        registry: &PhysicsStateRegistry,
        entity: EntityId,
        past_timestamp: f64,
    ) -> Option<PhysicsState> {
        let history = registry.history(entity)?;
        match history.closest(past_timestamp) {
            Some((_, state)) => Some(*state),
            None => {
                trace!(%entity, "no history, answering with current state");
                registry.state(entity).copied()
            }
        }
    }

    /// Drop history entries older than `max_age` across all entities.
    pub fn cleanup(&mut self, registry: &mut PhysicsStateRegistry, now: f64) {
        registry.sweep_history(now - self.config.max_age.as_secs_f64());
        self.last_cleanup = Some(now);
    }

    /// Run [`cleanup`](Self::cleanup) if the cleanup interval has elapsed.
    pub fn maybe_cleanup(&mut self, registry: &mut PhysicsStateRegistry, now: f64) {
        let due = match self.last_cleanup {
            Some(last) => now - last >= self.config.cleanup_interval.as_secs_f64(),
            None => true,
        };
        if due {
            self.cleanup(registry, now);
        }
    }
}
