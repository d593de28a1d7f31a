//! Issues
//!
//! The single issue representation both analyzers are normalized into, and
//! the ordering and filtering applied before issues reach the host.

pub mod src;


pub use src::*;
