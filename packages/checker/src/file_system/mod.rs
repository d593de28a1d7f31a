//! File System Abstraction
//!
//! Read-only view of the watched tree used by the program state, with a
//! native and an in-memory implementation.

pub mod src;


pub use src::*;
