use std::fmt;

use crate::core::boundary::Edge;
use crate::core::math::Vector2;

/// Opaque handle to a body in the world.
/// Handles are issued monotonically and never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle returned by `subscribe_collisions`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u32);

/// Whether a contact just started or just stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Began,
    Ended,
}

/// What a body made contact with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// One of the four boundary edges.
    Boundary(Edge),
    /// Another body (only in `Items` / `Everything` collision modes).
    Item(BodyId),
}

/// A contact transition emitted during `tick`. Not stored past the next tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub body: BodyId,
    pub kind: ContactKind,
    /// World-space contact point.
    pub point: Vector2,
    pub phase: ContactPhase,
}

impl CollisionEvent {
    /// The boundary edge involved, if this is a boundary contact.
    pub fn edge(&self) -> Option<Edge> {
        match self.kind {
            ContactKind::Boundary(edge) => Some(edge),
            ContactKind::Item(_) => None,
        }
    }

    pub fn began(&self) -> bool {
        self.phase == ContactPhase::Began
    }
}

/// Render-time view of a live body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vector2,
    pub velocity: Vector2,
    pub half_extents: Vector2,
    /// Current spin angle in radians, `0.0` when the body is not spinning.
    pub rotation_angle: f64,
}
