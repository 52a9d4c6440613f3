use crate::api::error::{DynamicsError, Result};
use crate::api::types::BodyId;
use crate::core::boundary::Edge;
use crate::core::math::{is_finite, Aabb, Vector2};

/// Builder for describing a body before it is added to the world.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub position: Vector2,
    pub velocity: Vector2,
    pub half_extents: Vector2,
    pub elasticity: f64,
}

impl BodyDesc {
    /// A box with the given half size, at rest at the origin, fully inelastic.
    pub fn new(half_extents: Vector2) -> Self {
        Self {
            position: Vector2::ZERO,
            velocity: Vector2::ZERO,
            half_extents,
            elasticity: 0.0,
        }
    }

    /// A square box with side length `size`.
    pub fn square(size: f64) -> Self {
        Self::new(Vector2::splat(size * 0.5))
    }

    pub fn with_position(mut self, pos: Vector2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_velocity(mut self, vel: Vector2) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_elasticity(mut self, elasticity: f64) -> Self {
        self.elasticity = elasticity;
        self
    }

    /// Check construction parameters.
    pub fn validate(&self) -> Result<()> {
        if !is_finite(self.half_extents) || self.half_extents.x <= 0.0 || self.half_extents.y <= 0.0 {
            return Err(DynamicsError::invalid(format!(
                "half extents must be positive, got {}",
                self.half_extents
            )));
        }
        if !(0.0..=1.0).contains(&self.elasticity) {
            return Err(DynamicsError::invalid(format!(
                "elasticity must be within [0, 1], got {}",
                self.elasticity
            )));
        }
        if !is_finite(self.position) || !is_finite(self.velocity) {
            return Err(DynamicsError::invalid("position and velocity must be finite"));
        }
        Ok(())
    }
}

/// Mutable physical state of one simulated box.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub position: Vector2,
    pub velocity: Vector2,
    pub half_extents: Vector2,
    /// Restitution in `[0, 1]`.
    pub elasticity: f64,
    /// Inactive bodies are skipped by every behavior.
    pub active: bool,
    /// Edge contact flags from the last tick, indexed by `Edge::index`.
    pub(crate) touching: [bool; 4],
    /// Last reported contact point per edge, reused for the `Ended` event.
    pub(crate) contact_points: [Vector2; 4],
}

impl Body {
    pub(crate) fn from_desc(id: BodyId, desc: &BodyDesc) -> Self {
        Self {
            id,
            position: desc.position,
            velocity: desc.velocity,
            half_extents: desc.half_extents,
            elasticity: desc.elasticity,
            active: true,
            touching: [false; 4],
            contact_points: [Vector2::ZERO; 4],
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.position, self.half_extents)
    }

    /// Whether the body was pressed against `edge` at the end of the last tick.
    pub fn is_touching(&self, edge: Edge) -> bool {
        self.touching[edge.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_pattern() {
        let desc = BodyDesc::square(80.0)
            .with_position(Vector2::new(10.0, 20.0))
            .with_velocity(Vector2::new(1.0, 2.0))
            .with_elasticity(0.2);

        assert_eq!(desc.half_extents, Vector2::splat(40.0));
        assert_eq!(desc.position, Vector2::new(10.0, 20.0));
        assert_eq!(desc.velocity, Vector2::new(1.0, 2.0));
        assert!((desc.elasticity - 0.2).abs() < 1e-12);
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn zero_size_is_invalid() {
        let err = BodyDesc::new(Vector2::ZERO).validate().unwrap_err();
        assert!(matches!(err, DynamicsError::InvalidSpec(_)));
    }

    #[test]
    fn elasticity_out_of_range_is_invalid() {
        assert!(BodyDesc::square(10.0).with_elasticity(1.5).validate().is_err());
        assert!(BodyDesc::square(10.0).with_elasticity(-0.1).validate().is_err());
        assert!(BodyDesc::square(10.0).with_elasticity(f64::NAN).validate().is_err());
        assert!(BodyDesc::square(10.0).with_elasticity(1.0).validate().is_ok());
    }

    #[test]
    fn non_finite_position_is_invalid() {
        let desc = BodyDesc::square(10.0).with_position(Vector2::new(f64::INFINITY, 0.0));
        assert!(desc.validate().is_err());
    }
}
