//! Worker Boundary
//!
//! Request/response protocol between a host and the checking service, with
//! an in-process thread worker and a line-delimited JSON server for running
//! the service in a child process.

pub mod src;

#[cfg(test)]
mod test;

pub use src::*;
