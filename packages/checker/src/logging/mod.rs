//! Logging
//!
//! Log level shared by the service options and the command line host. Events
//! themselves go through `tracing`.

pub mod src;

pub use src::*;
