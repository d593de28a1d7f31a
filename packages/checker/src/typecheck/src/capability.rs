use ts::Diagnostic;

use crate::program::ProgramSnapshot;

/// The type-checking engine the service drives.
///
/// Implementations receive a read-only snapshot and must not retain it past
/// the call. Any error fails the current iteration; nothing is retried.
pub trait TypeCheckCapability: Send {
    fn semantic_diagnostics(
        &self,
        snapshot: &ProgramSnapshot<'_>,
        file: &str,
    ) -> anyhow::Result<Vec<Diagnostic>>;

    fn syntactic_diagnostics(
        &self,
        snapshot: &ProgramSnapshot<'_>,
        file: &str,
    ) -> anyhow::Result<Vec<Diagnostic>>;

    /// Diagnostics not tied to a file, such as option errors.
    fn global_diagnostics(&self, _snapshot: &ProgramSnapshot<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        Ok(Vec::new())
    }
}

impl<T: TypeCheckCapability + Sync + ?Sized> TypeCheckCapability for std::sync::Arc<T> {
    fn semantic_diagnostics(
        &self,
        snapshot: &ProgramSnapshot<'_>,
        file: &str,
    ) -> anyhow::Result<Vec<Diagnostic>> {
        (**self).semantic_diagnostics(snapshot, file)
    }

    fn syntactic_diagnostics(
        &self,
        snapshot: &ProgramSnapshot<'_>,
        file: &str,
    ) -> anyhow::Result<Vec<Diagnostic>> {
        (**self).syntactic_diagnostics(snapshot, file)
    }

    fn global_diagnostics(&self, snapshot: &ProgramSnapshot<'_>) -> anyhow::Result<Vec<Diagnostic>> {
        (**self).global_diagnostics(snapshot)
    }
}
