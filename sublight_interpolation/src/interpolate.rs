//! Interpolation sessions: blend a proxy toward a received state over time.

use std::collections::HashMap;
use std::time::Duration;
use sublight_core::body::PhysicsBody;
use sublight_core::id::EntityId;
use sublight_core::state::PhysicsState;
use tracing::trace;

#[derive(Debug, Clone, Copy)]
pub struct InterpolationConfig {
    /// How long a proxy takes to blend toward a newly received state. Also
    /// the staleness bound past which the manager switches to extrapolation.
    pub delay: Duration,
    /// Cap on how far a stale proxy may be projected forward.
    pub max_extrapolation: Duration,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(100),
            max_extrapolation: Duration::from_millis(200),
        }
    }
}

impl InterpolationConfig {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_max_extrapolation(mut self, max_extrapolation: Duration) -> Self {
        self.max_extrapolation = max_extrapolation;
        self
    }
}

/// One in-flight blend from a start snapshot toward a target snapshot.
#[derive(Debug, Clone)]
pub struct InterpolationSession {
    pub start: PhysicsState,
    pub target: PhysicsState,
    pub elapsed: f32,
    pub duration: f32,
    pub active: bool,
}

impl InterpolationSession {
    /// Blend fraction in `[0, 1]`.
    pub fn alpha(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }
}

/// Component-wise linear blend between two snapshots.
///
/// Position, orientation and both velocities are lerped; the timestamp is
/// mixed on the same fraction so a mid-blend snapshot still reads as a
/// coherent instant. Sequence identity comes from the target, since the blend
/// is working toward it.
pub fn lerp_states(start: &PhysicsState, target: &PhysicsState, alpha: f32) -> PhysicsState {
    PhysicsState {
        position: start.position.lerp(target.position, alpha),
        orientation: start.orientation.lerp(target.orientation, alpha),
        linear_velocity: start.linear_velocity.lerp(target.linear_velocity, alpha),
        angular_velocity: start
            .angular_velocity
            .lerp(target.angular_velocity, alpha),
        timestamp: start.timestamp + (target.timestamp - start.timestamp) * alpha as f64,
        sequence: target.sequence,
        simulating_physics: target.simulating_physics,
    }
}

/// Owns every in-flight [`InterpolationSession`], keyed by entity.
#[derive(Debug, Default)]
pub struct Interpolator {
    sessions: HashMap<EntityId, InterpolationSession>,
}

impl Interpolator {
    /// Begin blending `entity` from `start` toward `target` over `duration`
    /// seconds. Replaces any session already in flight for the entity.
    pub fn start(
        &mut self,
        entity: EntityId,
        start: PhysicsState,
        target: PhysicsState,
        duration: f32,
    ) {
        trace!(%entity, duration, "starting interpolation session");
        self.sessions.insert(
            entity,
            InterpolationSession {
                start,
                target,
                elapsed: 0.0,
                duration,
                active: true,
            },
        );
    }

    pub fn is_active(&self, entity: EntityId) -> bool {
        self.sessions.get(&entity).is_some_and(|s| s.active)
    }

    pub fn session(&self, entity: EntityId) -> Option<&InterpolationSession> {
        self.sessions.get(&entity)
    }

    /// Advance the entity's session by `dt` and write the blended transform
    /// to the body. Returns `false` when no active session exists.
    ///
    /// The session deactivates itself once the blend fraction reaches 1, with
    /// the target applied exactly.
    pub fn update(&mut self, entity: EntityId, body: &mut dyn PhysicsBody, dt: f32) -> bool {
        let Some(session) = self.sessions.get_mut(&entity) else {
            return false;
        };
        if !session.active {
            return false;
        }
        session.elapsed += dt;
        let alpha = session.alpha();
        let blended = lerp_states(&session.start, &session.target, alpha);
        blended.apply_to(body);
        if alpha >= 1.0 {
            session.active = false;
            self.sessions.remove(&entity);
        }
        true
    }

    /// Drop the entity's session without applying anything further.
    pub fn stop(&mut self, entity: EntityId) {
        self.sessions.remove(&entity);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}

/// Helper for building a session start from whatever the body currently
/// shows, when no recorded state exists yet.
pub fn visible_snapshot(body: &dyn PhysicsBody, timestamp: f64, sequence: u64) -> PhysicsState {
    PhysicsState {
        position: body.position(),
        orientation: body.orientation(),
        linear_velocity: body.linear_velocity(),
        angular_velocity: body.angular_velocity(),
        timestamp,
        sequence,
        simulating_physics: body.is_simulating_physics(),
    }
}
