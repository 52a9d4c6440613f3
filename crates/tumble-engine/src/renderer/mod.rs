pub mod snapshot;

// Re-export key types for convenient access
pub use snapshot::{BodyInstance, SnapshotBuffer};
