//! Cancellation
//!
//! Cooperative cancellation threaded through every long-running call of an
//! iteration.

pub mod src;


pub use src::*;
