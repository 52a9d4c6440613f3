use log::{debug, warn};

use crate::api::error::{DynamicsError, Result};
use crate::api::types::{BodyId, BodyState, CollisionEvent, SubscriptionId};
use crate::command::queue::{Command, CommandQueue, CommandReceiver};
use crate::config::SandboxConfig;
use crate::core::behavior::Behavior;
use crate::core::body::BodyDesc;
use crate::core::boundary::Boundary;
use crate::core::math::Vector2;
use crate::core::world::World;
use crate::extensions::rotation::{RotationController, SpinDirection};
use crate::renderer::snapshot::{BodyInstance, SnapshotBuffer};

/// Command/query surface over a world and its rotation controller.
/// All calls are synchronous and must come from the thread that ticks.
pub struct Sandbox {
    world: World,
    rotation: RotationController,
}

impl Sandbox {
    /// Create an empty sandbox whose boundary spans `min`..`max`.
    pub fn new(min: Vector2, max: Vector2) -> Result<Self> {
        Ok(Self::with_seed(Boundary::new(min, max)?, 42))
    }

    pub fn with_seed(boundary: Boundary, seed: u64) -> Self {
        Self {
            world: World::new(boundary),
            rotation: RotationController::new(seed),
        }
    }

    /// Create an empty sandbox with the config's boundary and seed. Behaviors and bodies
    /// are left to the caller.
    pub fn from_config(config: &SandboxConfig) -> Result<Self> {
        let boundary = Boundary::new(config.boundary.min, config.boundary.max)?;
        Ok(Self::with_seed(boundary, config.seed))
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn rotation(&self) -> &RotationController {
        &self.rotation
    }

    pub fn boundary(&self) -> Boundary {
        self.world.boundary()
    }

    // -- Commands --

    /// Add a box at `position`. Fails with `InvalidSpec` on non-positive size or
    /// elasticity outside `[0, 1]`.
    pub fn add_body(&mut self, position: Vector2, half_extents: Vector2, elasticity: f64) -> Result<BodyId> {
        self.add_body_desc(
            BodyDesc::new(half_extents)
                .with_position(position)
                .with_elasticity(elasticity),
        )
    }

    pub fn add_body_desc(&mut self, desc: BodyDesc) -> Result<BodyId> {
        self.world.add_body(desc)
    }

    /// Remove a body and stop its rotation. Never fails; unknown handles are ignored.
    pub fn remove_body(&mut self, id: BodyId) {
        self.rotation.stop(id);
        self.world.remove_body(id);
    }

    pub fn add_behavior(&mut self, behavior: impl Into<Behavior>) {
        self.world.add_behavior(behavior);
    }

    pub fn clear_behaviors(&mut self) {
        self.world.clear_behaviors();
    }

    pub fn set_gravity(&mut self, direction: Vector2, magnitude: f64) {
        self.world.set_gravity(direction, magnitude);
    }

    /// Spin a live body once per `duration` seconds in a random direction.
    /// A body that is already spinning is left alone.
    pub fn start_rotation(&mut self, id: BodyId, duration: f64) -> Result<()> {
        self.start_rotation_with(id, duration, None)
    }

    pub fn start_rotation_with(
        &mut self,
        id: BodyId,
        duration: f64,
        direction: Option<SpinDirection>,
    ) -> Result<()> {
        if !self.world.contains(id) {
            return Err(DynamicsError::NotFound(id));
        }
        self.rotation.start(id, duration, direction)
    }

    /// Stop a body's spin. Never fails.
    pub fn stop_rotation(&mut self, id: BodyId) {
        self.rotation.stop(id);
    }

    pub fn subscribe_collisions<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&CollisionEvent) + 'static,
    {
        self.world.subscribe_collisions(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.world.unsubscribe(id)
    }

    /// Advance the world and every spin by `dt`.
    pub fn tick(&mut self, dt: f64) {
        self.world.tick(dt);
        self.rotation.advance(dt);
    }

    /// Apply one queued command. Returns the new handle for `AddBody`.
    pub fn apply(&mut self, command: Command) -> Result<Option<BodyId>> {
        match command {
            Command::AddBody(desc) => return self.add_body_desc(desc).map(Some),
            Command::RemoveBody(id) => self.remove_body(id),
            Command::SetGravity { direction, magnitude } => self.set_gravity(direction, magnitude),
            Command::StartRotation { body, duration, direction } => {
                self.start_rotation_with(body, duration, direction)?
            }
            Command::StopRotation(id) => self.stop_rotation(id),
        }
        Ok(None)
    }

    /// Apply every queued command in order. Failures are logged and skipped.
    /// Returns the number of commands applied successfully.
    pub fn drain(&mut self, queue: &mut CommandQueue) -> usize {
        self.apply_all(queue.drain())
    }

    /// Like `drain`, for commands submitted from another thread.
    pub fn drain_channel(&mut self, rx: &CommandReceiver) -> usize {
        self.apply_all(rx.try_iter())
    }

    fn apply_all(&mut self, commands: impl IntoIterator<Item = Command>) -> usize {
        let mut applied = 0;
        for command in commands {
            debug!("applying {command:?}");
            match self.apply(command) {
                Ok(_) => applied += 1,
                Err(e) => warn!("command skipped: {e}"),
            }
        }
        applied
    }

    // -- Queries --

    pub fn body_state(&self, id: BodyId) -> Result<BodyState> {
        let body = self.world.body(id).ok_or(DynamicsError::NotFound(id))?;
        Ok(BodyState {
            position: body.position,
            velocity: body.velocity,
            half_extents: body.half_extents,
            rotation_angle: self.rotation.angle(id).unwrap_or(0.0),
        })
    }

    pub fn body_at(&self, point: Vector2) -> Option<BodyId> {
        self.world.body_at(point)
    }

    pub fn collisions(&self) -> &[CollisionEvent] {
        self.world.collisions()
    }

    /// Rebuild `buffer` with one instance per live body, in insertion order.
    pub fn snapshot(&self, buffer: &mut SnapshotBuffer) {
        buffer.clear();
        for body in self.world.bodies() {
            buffer.push(BodyInstance {
                id: body.id.0 as f64,
                x: body.position.x,
                y: body.position.y,
                half_width: body.half_extents.x,
                half_height: body.half_extents.y,
                rotation: self.rotation.angle(body.id).unwrap_or(0.0),
            });
        }
    }
}
