use glam::DVec2;

/// 2D vector in world units.
pub type Vector2 = DVec2;

/// Tolerance used when deciding whether a box touches an edge or another box.
pub const CONTACT_EPSILON: f64 = 1e-9;

/// Axis-aligned box described by center and half size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vector2,
    pub half_extents: Vector2,
}

impl Aabb {
    pub fn new(center: Vector2, half_extents: Vector2) -> Self {
        Self { center, half_extents }
    }

    pub fn min(&self) -> Vector2 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vector2 {
        self.center + self.half_extents
    }

    /// Whether `point` lies inside the box (edges inclusive).
    pub fn contains(&self, point: Vector2) -> bool {
        let d = (point - self.center).abs();
        d.x <= self.half_extents.x && d.y <= self.half_extents.y
    }

    /// Per-axis overlap depth with `other`. Both components positive means the boxes overlap.
    pub fn overlap(&self, other: &Aabb) -> Vector2 {
        let reach = self.half_extents + other.half_extents;
        reach - (other.center - self.center).abs()
    }
}

/// Whether both components are finite.
pub fn is_finite(v: Vector2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
