//! Utility modules

pub mod memory_source;
pub mod normalize;

pub use memory_source::*;
pub use normalize::*;
