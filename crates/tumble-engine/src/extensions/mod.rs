// extensions/mod.rs
//
// Optional extension modules for Tumble.
// These run beside the World rather than inside it; a sandbox opts in per body.

pub mod rotation;

pub use rotation::{RotationController, RotationState, SpinDirection, DEFAULT_REVOLUTION_SECS};
