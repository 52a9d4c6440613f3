pub mod error;
pub mod sandbox;
pub mod types;
