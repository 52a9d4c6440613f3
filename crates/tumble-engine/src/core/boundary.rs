use serde::{Deserialize, Serialize};

use crate::api::error::{DynamicsError, Result};
use crate::core::math::{is_finite, Vector2};

/// One side of the boundary rectangle.
/// `Bottom` is the `min.y` side, `Top` the `max.y` side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    /// Slot in a per-body `[bool; 4]` contact array.
    pub(crate) fn index(self) -> usize {
        match self {
            Edge::Top => 0,
            Edge::Bottom => 1,
            Edge::Left => 2,
            Edge::Right => 3,
        }
    }
}

/// Static axis-aligned container rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub min: Vector2,
    pub max: Vector2,
}

impl Boundary {
    /// Create a boundary. Fails when `min` is not strictly below `max` on both axes.
    pub fn new(min: Vector2, max: Vector2) -> Result<Self> {
        if !is_finite(min) || !is_finite(max) {
            return Err(DynamicsError::invalid("boundary corners must be finite"));
        }
        if min.x >= max.x || min.y >= max.y {
            return Err(DynamicsError::invalid(format!(
                "boundary min {min} must be below max {max}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vector2 {
        (self.min + self.max) * 0.5
    }

    /// Point on `edge` closest to `position`, used as the reported contact point.
    pub fn contact_point(&self, edge: Edge, position: Vector2) -> Vector2 {
        let x = position.x.clamp(self.min.x, self.max.x);
        let y = position.y.clamp(self.min.y, self.max.y);
        match edge {
            Edge::Top => Vector2::new(x, self.max.y),
            Edge::Bottom => Vector2::new(x, self.min.y),
            Edge::Left => Vector2::new(self.min.x, y),
            Edge::Right => Vector2::new(self.max.x, y),
        }
    }
}
