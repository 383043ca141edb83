//! Reconciling a predicted state against the authoritative server state.
//!
//! Three outcomes per authoritative update, by positional error:
//! - below the jitter gate (a fraction of the divergence threshold): skip,
//!   the drift is too small to be worth moving the entity for;
//! - above the divergence threshold: hard snap to the server state;
//! - in between: record the server state as the new truth and blend the
//!   visible transform toward it over the correction delay, so the player
//!   never sees the fix.

use std::collections::HashMap;
use std::time::Duration;
use sublight_core::body::PhysicsBody;
use sublight_core::events::Observers;
use sublight_core::id::EntityId;
use sublight_core::registry::PhysicsStateRegistry;
use sublight_core::state::PhysicsState;
use sublight_interpolation::interpolate::Interpolator;
use tracing::{debug, trace, warn};

/// Fraction of the divergence threshold below which reconciliation skips.
const JITTER_GATE_RATIO: f32 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct PredictionConfig {
    /// Positional error beyond which the correction is an immediate snap.
    pub error_threshold: f32,
    /// How long a smooth correction takes to blend out.
    pub correction_delay: Duration,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            error_threshold: 5.0,
            correction_delay: Duration::from_millis(100),
        }
    }
}

impl PredictionConfig {
    pub fn with_error_threshold(mut self, error_threshold: f32) -> Self {
        self.error_threshold = error_threshold;
        self
    }

    pub fn with_correction_delay(mut self, correction_delay: Duration) -> Self {
        self.correction_delay = correction_delay;
        self
    }
}

/// How a correction was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionKind {
    /// Divergence: the entity was snapped to the server state.
    Snap,
    /// Small drift: the visible transform is blending toward the server state.
    Smooth,
}

/// Emitted synchronously right after a correction is applied.
#[derive(Debug, Clone, Copy)]
pub struct CorrectionEvent {
    pub entity: EntityId,
    pub error: f32,
    pub kind: CorrectionKind,
}

/// Streaming reconciliation statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionStats {
    /// Authoritative updates that passed the jitter gate.
    pub reconciliations: u64,
    /// Streaming mean of the positional prediction error.
    pub mean_error: f32,
}

impl PredictionStats {
    fn record(&mut self, error: f32) {
        self.reconciliations += 1;
        self.mean_error += (error - self.mean_error) / self.reconciliations as f32;
    }
}

/// Compares predicted state with authoritative server state and corrects.
pub struct ServerReconciler {
    config: PredictionConfig,
    stats: PredictionStats,
    /// (timestamp, sequence) of the last accepted server state per entity,
    /// for stale/duplicate rejection.
    last_accepted: HashMap<EntityId, (f64, u64)>,
    observers: Observers<CorrectionEvent>,
}

impl Default for ServerReconciler {
    fn default() -> Self {
        Self::new(PredictionConfig::default())
    }
}

impl ServerReconciler {
    pub fn new(config: PredictionConfig) -> Self {
        Self {
            config,
            stats: PredictionStats::default(),
            last_accepted: HashMap::new(),
            observers: Observers::default(),
        }
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    pub fn stats(&self) -> PredictionStats {
        self.stats
    }

    /// Subscribe to corrections. Observers run synchronously, right after the
    /// correction is applied.
    pub fn on_correction(&mut self, observer: impl FnMut(&CorrectionEvent) + 'static) {
        self.observers.subscribe(observer);
    }

    /// Whether an error is worth correcting at all.
    pub fn should_reconcile(&self, error: f32) -> bool {
        error >= self.config.error_threshold * JITTER_GATE_RATIO
    }

    /// Drop per-entity bookkeeping on unregistration.
    pub fn forget(&mut self, entity: EntityId) {
        self.last_accepted.remove(&entity);
    }

    /// Reconcile one entity against an authoritative state.
    ///
    /// Returns `true` when the server state was accepted (even if the error
    /// was below the jitter gate and nothing moved); `false` for stale or
    /// unregistered updates, which mutate nothing.
    pub fn reconcile(
        &mut self,
        registry: &mut PhysicsStateRegistry,
        interpolator: &mut Interpolator,
        body: &mut dyn PhysicsBody,
        entity: EntityId,
        server_state: PhysicsState,
    ) -> bool {
        if !registry.is_registered(entity) {
            return false;
        }
        if let Some((timestamp, sequence)) = self.last_accepted.get(&entity) {
            if server_state.timestamp <= *timestamp || server_state.sequence <= *sequence {
                debug!(
                    %entity,
                    sequence = server_state.sequence,
                    last = *sequence,
                    "rejecting stale server state"
                );
                #[cfg(feature = "metrics")]
                metrics::counter!("reconciliation::stale_states").increment(1);
                return false;
            }
        }
        self.last_accepted
            .insert(entity, (server_state.timestamp, server_state.sequence));

        let Some(predicted) = registry.state(entity).copied() else {
            // first authoritative state for this entity, nothing to compare
            registry.apply_state(entity, server_state, body);
            return true;
        };

        let error = predicted.position_error(&server_state);
        if !self.should_reconcile(error) {
            trace!(%entity, error, "prediction drift below jitter gate");
            return true;
        }

        self.stats.record(error);
        if error > self.config.error_threshold {
            warn!(%entity, error, "prediction diverged from server state, snapping");
            interpolator.stop(entity);
            registry.apply_state(entity, server_state, body);
            #[cfg(feature = "metrics")]
            metrics::counter!("reconciliation::snaps").increment(1);
            self.observers.emit(&CorrectionEvent {
                entity,
                error,
                kind: CorrectionKind::Snap,
            });
        } else {
            // record the truth, blend the visible transform toward it
            registry.set_state(entity, server_state);
            interpolator.start(
                entity,
                predicted,
                server_state,
                self.config.correction_delay.as_secs_f32(),
            );
            #[cfg(feature = "metrics")]
            metrics::counter!("reconciliation::corrections").increment(1);
            self.observers.emit(&CorrectionEvent {
                entity,
                error,
                kind: CorrectionKind::Smooth,
            });
        }
        true
    }
}
