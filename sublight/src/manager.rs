//! Per-frame orchestration: one [`PhysicsSyncManager`] per process.

use bytes::Bytes;
use sublight_core::body::BodyRegistry;
use sublight_core::id::EntityId;
use sublight_core::registry::PhysicsStateRegistry;
use sublight_core::state::{PhysicsMode, PhysicsState};
use sublight_core::time::{SessionClock, SteadyClock};
use sublight_interpolation::extrapolate::extrapolate;
use sublight_interpolation::interpolate::{Interpolator, visible_snapshot};
use sublight_lag_compensation::LagCompensator;
use sublight_prediction::predictor::ClientPredictor;
use sublight_prediction::reconciliation::{CorrectionEvent, PredictionStats, ServerReconciler};
use tracing::{debug, trace};

use crate::config::SyncConfig;

/// Which side of the wire this process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkRole {
    Server,
    Client,
}

/// Owns the synchronization subsystems and dispatches the per-frame work.
///
/// Drive it from any fixed-step loop:
///
/// ```ignore
/// let mut manager = PhysicsSyncManager::new(NetworkRole::Client, SyncConfig::default());
/// loop {
///     manager.update(&mut world, dt);
/// }
/// ```
///
/// `world` is whatever implements [`BodyRegistry`]; the manager holds ids,
/// never bodies.
pub struct PhysicsSyncManager {
    role: NetworkRole,
    config: SyncConfig,
    registry: PhysicsStateRegistry,
    predictor: ClientPredictor,
    reconciler: ServerReconciler,
    interpolator: Interpolator,
    lag_compensation: LagCompensator,
    clock: Box<dyn SessionClock>,
}

impl PhysicsSyncManager {
    pub fn new(role: NetworkRole, config: SyncConfig) -> Self {
        Self::with_clock(role, config, Box::new(SteadyClock::default()))
    }

    /// Construct with an explicit clock, e.g. a manual one for tests or a
    /// clock slaved to the transport's synchronized session time.
    pub fn with_clock(role: NetworkRole, config: SyncConfig, clock: Box<dyn SessionClock>) -> Self {
        Self {
            role,
            registry: PhysicsStateRegistry::with_history_capacity(config.history_capacity),
            predictor: ClientPredictor::default(),
            reconciler: ServerReconciler::new(config.prediction),
            interpolator: Interpolator::default(),
            lag_compensation: LagCompensator::new(config.lag_compensation),
            config,
            clock,
        }
    }

    pub fn role(&self) -> NetworkRole {
        self.role
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Current session time in seconds.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    // ---------------------------------------------------------------------
    // registration

    pub fn register_entity(&mut self, entity: EntityId, mode: PhysicsMode) -> bool {
        self.registry.register(entity, mode)
    }

    /// Remove an entity from every subordinate map in one call, so no
    /// subsystem is left holding a key for a despawned ship.
    pub fn unregister_entity(&mut self, entity: EntityId) -> bool {
        let was_known = self.registry.unregister(entity);
        self.interpolator.stop(entity);
        self.predictor.forget(entity);
        self.reconciler.forget(entity);
        was_known
    }

    pub fn set_mode(&mut self, entity: EntityId, mode: PhysicsMode) -> bool {
        let changed = self.registry.set_mode(entity, mode);
        if changed && mode != PhysicsMode::Simulated {
            // a leftover blend session only makes sense for a proxy
            self.interpolator.stop(entity);
        }
        changed
    }

    pub fn mode(&self, entity: EntityId) -> Option<PhysicsMode> {
        self.registry.mode(entity)
    }

    // ---------------------------------------------------------------------
    // state

    pub fn state(&self, entity: EntityId) -> Option<PhysicsState> {
        self.registry.state(entity).copied()
    }

    /// Record a snapshot as current state + history, without touching the
    /// visible transform.
    pub fn set_state(&mut self, entity: EntityId, state: PhysicsState) -> bool {
        self.registry.set_state(entity, state)
    }

    /// Record a snapshot and push it onto the visible transform. Falls back
    /// to recording only when the body is gone already.
    pub fn apply_state(
        &mut self,
        bodies: &mut dyn BodyRegistry,
        entity: EntityId,
        state: PhysicsState,
    ) -> bool {
        match bodies.body_mut(entity) {
            Some(body) => self.registry.apply_state(entity, state, body),
            None => {
                trace!(%entity, "no body to apply state to, recording only");
                self.registry.set_state(entity, state)
            }
        }
    }

    // ---------------------------------------------------------------------
    // prediction

    pub fn enable_client_prediction(&mut self, entity: EntityId, enabled: bool) -> bool {
        self.registry.enable_prediction(entity, enabled)
    }

    /// Buffer a raw input sample for the replay extension point.
    pub fn store_input_state(&mut self, entity: EntityId, payload: Bytes, timestamp: f64) -> bool {
        self.predictor.store_input(entity, payload, timestamp)
    }

    pub fn prediction_stats(&self) -> PredictionStats {
        self.reconciler.stats()
    }

    /// Subscribe to snap/smooth correction events.
    pub fn on_correction(&mut self, observer: impl FnMut(&CorrectionEvent) + 'static) {
        self.reconciler.on_correction(observer);
    }

    // ---------------------------------------------------------------------
    // receiving authoritative state

    /// Reconcile a predicted entity against an authoritative update. Only
    /// meaningful for Autonomous entities; anything else is a no-op.
    pub fn reconcile_with_server(
        &mut self,
        bodies: &mut dyn BodyRegistry,
        entity: EntityId,
        server_state: PhysicsState,
    ) -> bool {
        if self.registry.mode(entity) != Some(PhysicsMode::Autonomous) {
            return false;
        }
        let Some(body) = bodies.body_mut(entity) else {
            return false;
        };
        self.reconciler.reconcile(
            &mut self.registry,
            &mut self.interpolator,
            body,
            entity,
            server_state,
        )
    }

    /// Ingest an authoritative update for any entity, dispatching on mode:
    /// Autonomous entities reconcile, Simulated proxies start blending toward
    /// the update, Authority entities just record it.
    pub fn receive_server_state(
        &mut self,
        bodies: &mut dyn BodyRegistry,
        entity: EntityId,
        server_state: PhysicsState,
    ) -> bool {
        match self.registry.mode(entity) {
            Some(PhysicsMode::Autonomous) => {
                self.reconcile_with_server(bodies, entity, server_state)
            }
            Some(PhysicsMode::Simulated) => {
                // out-of-order and duplicate updates must be rejected
                if let Some(current) = self.registry.state(entity) {
                    if server_state.timestamp <= current.timestamp
                        || server_state.sequence <= current.sequence
                    {
                        debug!(
                            %entity,
                            sequence = server_state.sequence,
                            "rejecting stale update for simulated proxy"
                        );
                        return false;
                    }
                }
                let start = match bodies.body_mut(entity) {
                    Some(body) => {
                        visible_snapshot(&*body, self.clock.now(), server_state.sequence)
                    }
                    None => match self.registry.state(entity) {
                        Some(current) => *current,
                        None => server_state,
                    },
                };
                self.registry.set_state(entity, server_state);
                self.interpolator.start(
                    entity,
                    start,
                    server_state,
                    self.config.interpolation.delay.as_secs_f32(),
                );
                true
            }
            Some(PhysicsMode::Authority) => self.registry.set_state(entity, server_state),
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // lag compensation

    /// Where this entity appeared to be at `past_timestamp`. Server-side.
    pub fn historical_state(&self, entity: EntityId, past_timestamp: f64) -> Option<PhysicsState> {
        self.lag_compensation
            .historical_state(&self.registry, entity, past_timestamp)
    }

    // ---------------------------------------------------------------------
    // per-frame update

    /// Run one frame of synchronization work, dispatching on role, then the
    /// periodic history sweep.
    pub fn update(&mut self, bodies: &mut dyn BodyRegistry, dt: f32) {
        match self.role {
            NetworkRole::Server => self.server_update(bodies, dt),
            NetworkRole::Client => self.client_update(bodies, dt),
        }
        let now = self.clock.now();
        self.lag_compensation.maybe_cleanup(&mut self.registry, now);
    }

    /// Authority path: pull ground truth from the simulation for every
    /// Authority entity, stamp and record it.
    pub fn server_update(&mut self, bodies: &mut dyn BodyRegistry, _dt: f32) {
        let now = self.clock.now();
        for entity in self.registry.ids_in_mode(PhysicsMode::Authority) {
            let Some(body) = bodies.body_mut(entity) else {
                continue;
            };
            let state = PhysicsState::capture(&*body, now, self.registry.next_sequence(entity));
            self.registry.set_state(entity, state);
        }
    }

    /// Client path: predict Autonomous entities, smooth Simulated ones.
    pub fn client_update(&mut self, bodies: &mut dyn BodyRegistry, dt: f32) {
        let now = self.clock.now();
        for entity in self.registry.ids_in_mode(PhysicsMode::Autonomous) {
            if !self.registry.prediction_enabled(entity) {
                continue;
            }
            let Some(body) = bodies.body_mut(entity) else {
                continue;
            };
            self.predictor
                .predict(&mut self.registry, body, entity, dt, now);
            // an in-flight smooth correction overrides the visible transform
            // until it has blended out
            self.interpolator.update(entity, body, dt);
        }

        for entity in self.registry.ids_in_mode(PhysicsMode::Simulated) {
            let Some(body) = bodies.body_mut(entity) else {
                continue;
            };
            if self.interpolator.update(entity, body, dt) {
                continue;
            }
            // no blend in flight: if the last update is older than the
            // interpolation delay, project it forward (clamped) so the proxy
            // keeps moving instead of freezing in place
            let Some(current) = self.registry.state(entity) else {
                continue;
            };
            let age = now - current.timestamp;
            if age > self.config.interpolation.delay.as_secs_f64() {
                let projected = extrapolate(
                    current,
                    age as f32,
                    self.config.interpolation.max_extrapolation,
                );
                projected.apply_to(body);
            }
        }
    }
}

impl core::fmt::Debug for PhysicsSyncManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PhysicsSyncManager")
            .field("role", &self.role)
            .field("entities", &self.registry.len())
            .finish()
    }
}
