pub mod api;
pub mod command;
pub mod config;
pub mod core;
pub mod demo;
pub mod extensions;
pub mod renderer;

// Re-export key types at crate root for convenience
pub use api::error::{DynamicsError, Result};
pub use api::sandbox::Sandbox;
pub use api::types::{BodyId, BodyState, CollisionEvent, ContactKind, ContactPhase, SubscriptionId};
pub use command::queue::{command_channel, Command, CommandQueue, CommandReceiver, CommandSender};
pub use config::{BoundaryConfig, BoxConfig, GravityConfig, RotationConfig, SandboxConfig};
pub use core::behavior::{
    Behavior, BounceBehavior, BoundaryCollisionBehavior, CollisionMode, GravityBehavior, ItemSet,
    GRAVITY_UNIT,
};
pub use core::body::{Body, BodyDesc};
pub use core::boundary::{Boundary, Edge};
pub use core::math::{Aabb, Vector2};
pub use core::time::FixedTimestep;
pub use core::world::World;
pub use demo::BoxDrop;
pub use renderer::snapshot::{BodyInstance, SnapshotBuffer};

// Extensions: layered on top of the world, opt-in per body
pub use extensions::{RotationController, RotationState, SpinDirection, DEFAULT_REVOLUTION_SECS};
