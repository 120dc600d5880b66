//! Reconciliation of point-of-sale sales against bank statement credits

pub mod engine;
pub mod pool;
pub mod result;

pub use engine::*;
pub use pool::*;
pub use result::*;
