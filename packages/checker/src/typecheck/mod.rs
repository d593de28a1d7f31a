//! Type Checker Adapter
//!
//! Bridges the program state to an external type-checking capability.

pub mod src;

#[cfg(test)]
mod test;

pub use src::*;
