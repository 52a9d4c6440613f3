use serde::{Deserialize, Serialize};

use crate::api::error::{DynamicsError, Result};
use crate::api::types::BodyId;
use crate::core::boundary::Boundary;
use crate::core::math::Vector2;

/// Acceleration in world units/s² produced by a gravity magnitude of `1.0`.
pub const GRAVITY_UNIT: f64 = 1000.0;

/// Which bodies a behavior applies to.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ItemSet {
    /// Every active body in the world.
    #[default]
    All,
    /// Only the listed bodies.
    Listed(Vec<BodyId>),
}

impl ItemSet {
    pub fn contains(&self, id: BodyId) -> bool {
        match self {
            ItemSet::All => true,
            ItemSet::Listed(ids) => ids.contains(&id),
        }
    }

    pub(crate) fn remove(&mut self, id: BodyId) {
        if let ItemSet::Listed(ids) = self {
            ids.retain(|&i| i != id);
        }
    }
}

/// Constant acceleration along a direction.
#[derive(Debug, Clone, PartialEq)]
pub struct GravityBehavior {
    pub direction: Vector2,
    pub magnitude: f64,
    pub items: ItemSet,
}

impl GravityBehavior {
    pub fn new(direction: Vector2, magnitude: f64) -> Self {
        Self {
            direction,
            magnitude,
            items: ItemSet::All,
        }
    }

    /// Acceleration in world units/s². A zero direction yields no acceleration.
    pub fn acceleration(&self) -> Vector2 {
        self.direction.normalize_or_zero() * self.magnitude * GRAVITY_UNIT
    }
}

impl Default for GravityBehavior {
    fn default() -> Self {
        Self::new(Vector2::new(0.0, -1.0), 1.0)
    }
}

/// What a collision behavior collides bodies against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionMode {
    /// Bodies collide with each other only.
    Items,
    /// Bodies collide with the boundary only.
    #[default]
    Boundaries,
    /// Bodies collide with each other and the boundary.
    Everything,
}

impl CollisionMode {
    pub fn hits_items(self) -> bool {
        matches!(self, CollisionMode::Items | CollisionMode::Everything)
    }

    pub fn hits_boundary(self) -> bool {
        matches!(self, CollisionMode::Boundaries | CollisionMode::Everything)
    }
}

/// Keeps bodies inside a boundary by clamping position and stopping inbound velocity.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCollisionBehavior {
    pub boundary: Boundary,
    pub mode: CollisionMode,
    pub items: ItemSet,
}

impl BoundaryCollisionBehavior {
    pub fn new(boundary: Boundary) -> Self {
        Self {
            boundary,
            mode: CollisionMode::Boundaries,
            items: ItemSet::All,
        }
    }

    pub fn with_mode(mut self, mode: CollisionMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Restitution applied on the tick a contact begins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BounceBehavior {
    /// Replaces each body's own elasticity when set. Only `with_elasticity` sets it.
    elasticity_override: Option<f64>,
    pub items: ItemSet,
}

impl BounceBehavior {
    /// Bounce using each body's own elasticity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounce every item with the same elasticity. Fails outside `[0, 1]`.
    pub fn with_elasticity(elasticity: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&elasticity) {
            return Err(DynamicsError::invalid(format!(
                "bounce elasticity must be within [0, 1], got {elasticity}"
            )));
        }
        Ok(Self {
            elasticity_override: Some(elasticity),
            items: ItemSet::All,
        })
    }

    pub fn elasticity_override(&self) -> Option<f64> {
        self.elasticity_override
    }

    pub fn elasticity_for(&self, body_elasticity: f64) -> f64 {
        self.elasticity_override.unwrap_or(body_elasticity)
    }
}

/// A composable rule applied every tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Gravity(GravityBehavior),
    BoundaryCollision(BoundaryCollisionBehavior),
    Bounce(BounceBehavior),
}

impl Behavior {
    pub fn items(&self) -> &ItemSet {
        match self {
            Behavior::Gravity(b) => &b.items,
            Behavior::BoundaryCollision(b) => &b.items,
            Behavior::Bounce(b) => &b.items,
        }
    }

    pub(crate) fn items_mut(&mut self) -> &mut ItemSet {
        match self {
            Behavior::Gravity(b) => &mut b.items,
            Behavior::BoundaryCollision(b) => &mut b.items,
            Behavior::Bounce(b) => &mut b.items,
        }
    }

    /// Restrict this behavior to the given bodies.
    pub fn with_items(mut self, ids: impl IntoIterator<Item = BodyId>) -> Self {
        *self.items_mut() = ItemSet::Listed(ids.into_iter().collect());
        self
    }
}

impl From<GravityBehavior> for Behavior {
    fn from(b: GravityBehavior) -> Self {
        Behavior::Gravity(b)
    }
}

impl From<BoundaryCollisionBehavior> for Behavior {
    fn from(b: BoundaryCollisionBehavior) -> Self {
        Behavior::BoundaryCollision(b)
    }
}

impl From<BounceBehavior> for Behavior {
    fn from(b: BounceBehavior) -> Self {
        Behavior::Bounce(b)
    }
}
