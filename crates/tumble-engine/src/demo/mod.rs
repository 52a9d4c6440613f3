pub mod box_drop;

pub use box_drop::BoxDrop;
