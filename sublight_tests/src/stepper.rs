//! The shared test harness: stub bodies, a manual clock and a frame driver.

use bevy_math::Vec3;
use std::collections::HashMap;
use std::rc::Rc;
use sublight::config::SyncConfig;
use sublight::manager::{NetworkRole, PhysicsSyncManager};
use sublight_core::body::{BodyRegistry, PhysicsBody};
use sublight_core::id::EntityId;
use sublight_core::time::ManualClock;

/// A stand-in rigid body: plain fields, no physics of its own.
#[derive(Debug, Default, Clone)]
pub struct TestBody {
    pub position: Vec3,
    pub orientation: Vec3,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Forces applied through the body, accumulated for assertions.
    pub accumulated_force: Vec3,
}

impl TestBody {
    pub fn moving(position: Vec3, linear_velocity: Vec3) -> Self {
        Self {
            position,
            linear_velocity,
            ..Default::default()
        }
    }
}

impl PhysicsBody for TestBody {
    fn position(&self) -> Vec3 {
        self.position
    }
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
    fn orientation(&self) -> Vec3 {
        self.orientation
    }
    fn set_orientation(&mut self, orientation: Vec3) {
        self.orientation = orientation;
    }
    fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }
    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
    }
    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }
    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
    }
    fn apply_force(&mut self, force: Vec3) {
        self.accumulated_force += force;
    }
}

/// A world of test bodies addressed by id.
#[derive(Debug, Default)]
pub struct TestWorld {
    bodies: HashMap<EntityId, TestBody>,
}

impl TestWorld {
    pub fn spawn(&mut self, entity: EntityId, body: TestBody) {
        self.bodies.insert(entity, body);
    }

    pub fn despawn(&mut self, entity: EntityId) {
        self.bodies.remove(&entity);
    }

    pub fn body(&self, entity: EntityId) -> &TestBody {
        &self.bodies[&entity]
    }

    pub fn get_mut(&mut self, entity: EntityId) -> &mut TestBody {
        self.bodies.get_mut(&entity).unwrap()
    }
}

/// A latency provider reporting a flat zero for every player, so scenario
/// tolerances stay pure base + decay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroLatency;

impl sublight_consensus::environment::LatencyProvider for ZeroLatency {
    fn latency_secs(&self, _player: sublight_core::id::PlayerId) -> Option<f64> {
        Some(0.0)
    }
}

/// A gravity field that is the same everywhere.
#[derive(Debug, Clone, Copy)]
pub struct UniformGravity(pub Vec3);

impl sublight_consensus::environment::GravityProvider for UniformGravity {
    fn gravity_force(&self, _position: Vec3) -> Vec3 {
        self.0
    }
}

impl BodyRegistry for TestWorld {
    fn body_mut(&mut self, entity: EntityId) -> Option<&mut dyn PhysicsBody> {
        self.bodies
            .get_mut(&entity)
            .map(|body| body as &mut dyn PhysicsBody)
    }
}

/// Drives a [`PhysicsSyncManager`] frame by frame on a manual clock.
pub struct Stepper {
    pub manager: PhysicsSyncManager,
    pub world: TestWorld,
    pub clock: Rc<ManualClock>,
    pub frame_dt: f32,
}

impl Stepper {
    pub fn new(role: NetworkRole, config: SyncConfig, frame_dt: f32) -> Self {
        let clock = Rc::new(ManualClock::default());
        let manager = PhysicsSyncManager::with_clock(role, config, Box::new(clock.clone()));
        Self {
            manager,
            world: TestWorld::default(),
            clock,
            frame_dt,
        }
    }

    /// A client stepping 20 frames per second. The coarse frame keeps the
    /// arithmetic in scenarios exact.
    pub fn client() -> Self {
        Self::new(NetworkRole::Client, SyncConfig::default(), 0.05)
    }

    pub fn server() -> Self {
        Self::new(NetworkRole::Server, SyncConfig::default(), 0.05)
    }

    /// Advance the clock by one frame and run the per-frame update.
    pub fn step(&mut self) {
        self.clock.advance(self.frame_dt as f64);
        self.manager.update(&mut self.world, self.frame_dt);
    }

    pub fn step_frames(&mut self, frames: usize) {
        for _ in 0..frames {
            self.step();
        }
    }
}
