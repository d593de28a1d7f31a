//! Configuration
//!
//! Checker options and the tsconfig-backed project configuration.

pub mod src;


pub use src::*;
