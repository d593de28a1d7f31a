//! Capabilities backed by the `tsc` and `eslint` executables.

pub mod eslint;
pub mod tsc;

pub use eslint::{parse_eslint_output, EslintCapability};
pub use tsc::{parse_tsc_output, TscCapability, TscDiagnostic};
