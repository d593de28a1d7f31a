pub mod token;

pub use token::{CancellationToken, CancellationTokenDescriptor};
