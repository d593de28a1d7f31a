//! Checking Service
//!
//! The worker-side state machine driving one watch session: it owns the
//! program state and the lint cache and hands out one cancellable iteration
//! at a time.

pub mod src;


pub use src::*;
