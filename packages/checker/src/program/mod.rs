//! Incremental Program
//!
//! The persistent program snapshot: file records, import resolution, the
//! dependency graph and the per-iteration diff.

pub mod src;

#[cfg(test)]
mod test;

pub use src::*;
