//! Lint Adapter
//!
//! Runs the optional linter over changed files and keeps the latest report
//! of every file in a cache.

pub mod src;


pub use src::*;
