use log::{info, warn};

use crate::api::error::Result;
use crate::api::types::{BodyId, ContactPhase};
use crate::api::sandbox::Sandbox;
use crate::config::{BoxConfig, SandboxConfig};
use crate::core::behavior::{BounceBehavior, BoundaryCollisionBehavior, GravityBehavior};
use crate::core::body::BodyDesc;
use crate::core::math::Vector2;

/// The two-box demo: "start" drops the boxes under the configured gravity and spins them,
/// tapping a box removes it.
pub struct BoxDrop {
    config: SandboxConfig,
    sandbox: Sandbox,
    /// One slot per configured box; `None` once the box was tapped away.
    boxes: Vec<Option<BodyId>>,
    behaviors_installed: bool,
}

impl BoxDrop {
    /// Build the demo with its boxes in their resting layout and no behaviors.
    pub fn new(config: SandboxConfig) -> Result<Self> {
        config.validate()?;
        let mut sandbox = Sandbox::from_config(&config)?;
        sandbox.subscribe_collisions(|event| match event.phase {
            ContactPhase::Began => info!("began collision: body {} at {}", event.body, event.point),
            ContactPhase::Ended => info!("end collision: body {}", event.body),
        });
        let mut demo = Self {
            boxes: vec![None; config.boxes.len()],
            config,
            sandbox,
            behaviors_installed: false,
        };
        demo.place_missing_boxes()?;
        Ok(demo)
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Handles of the boxes still on screen, in config order.
    pub fn live_boxes(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.boxes.iter().flatten().copied()
    }

    /// Start button: bring back tapped-away boxes, install gravity, boundary collision and
    /// bounce once, then spin every box.
    pub fn start(&mut self) -> Result<()> {
        self.place_missing_boxes()?;

        if !self.behaviors_installed {
            // Build the whole set first so a bad value installs nothing.
            let gravity = self.config.gravity;
            let bounce = BounceBehavior::with_elasticity(self.config.elasticity)?;
            let collision = BoundaryCollisionBehavior::new(self.sandbox.boundary())
                .with_mode(self.config.collision_mode);
            self.sandbox
                .add_behavior(GravityBehavior::new(gravity.direction, gravity.magnitude));
            self.sandbox.add_behavior(collision);
            self.sandbox.add_behavior(bounce);
            self.behaviors_installed = true;
        }

        let duration = self.config.rotation.duration;
        for id in self.boxes.iter().flatten() {
            self.sandbox.start_rotation(*id, duration)?;
        }
        info!("started with {} boxes", self.live_boxes().count());
        Ok(())
    }

    /// Remove the box under `point`, if any.
    pub fn tap(&mut self, point: Vector2) -> Option<BodyId> {
        let id = self.sandbox.body_at(point)?;
        self.sandbox.stop_rotation(id);
        self.sandbox.remove_body(id);
        for slot in self.boxes.iter_mut().filter(|s| **s == Some(id)) {
            *slot = None;
        }
        info!("tapped body {id}");
        Some(id)
    }

    /// Drop every box and behavior and restore the initial resting layout.
    pub fn reset(&mut self) -> Result<()> {
        for id in self.boxes.iter_mut().filter_map(Option::take) {
            self.sandbox.remove_body(id);
        }
        self.sandbox.clear_behaviors();
        self.behaviors_installed = false;
        self.place_missing_boxes()?;
        info!("reset");
        Ok(())
    }

    pub fn tick(&mut self, dt: f64) {
        self.sandbox.tick(dt);
    }

    fn place_missing_boxes(&mut self) -> Result<()> {
        let boundary = self.sandbox.boundary();
        for (slot, spec) in self.boxes.iter_mut().zip(self.config.boxes.iter()) {
            if slot.is_some() {
                continue;
            }
            let desc = resting_box(spec, boundary.min, boundary.max, self.config.elasticity);
            match self.sandbox.add_body_desc(desc) {
                Ok(id) => *slot = Some(id),
                Err(e) => {
                    warn!("box {:?} not placed: {e}", spec.name);
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

/// Square box sitting on the bottom edge, `trailing_inset` left of the right edge.
fn resting_box(spec: &BoxConfig, min: Vector2, max: Vector2, elasticity: f64) -> BodyDesc {
    let half = spec.size * 0.5;
    BodyDesc::square(spec.size)
        .with_position(Vector2::new(max.x - spec.trailing_inset - half, min.y + half))
        .with_elasticity(spec.elasticity.unwrap_or(elasticity))
}
