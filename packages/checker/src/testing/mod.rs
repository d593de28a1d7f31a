//! Testing
//!
//! Deterministic, rule-driven capabilities for exercising the service
//! without a real type checker or linter.

pub mod src;

pub use src::*;
