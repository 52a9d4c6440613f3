pub mod behavior;
pub mod body;
pub mod boundary;
pub mod math;
pub mod rng;
pub mod time;
pub mod world;
