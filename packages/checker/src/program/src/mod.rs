pub mod dependency_graph;
pub mod diff;
pub mod imports;
pub mod record;
pub mod resolution;
pub mod snapshot;
pub mod state;

pub use dependency_graph::FileDependencyGraph;
pub use diff::IterationDiff;
pub use imports::{scan_imports, ImportReference, ReferenceKind};
pub use record::FileRecord;
pub use resolution::{
    DefaultModuleResolver, DefaultTypeReferenceResolver, ModuleNameResolver, ModuleResolver,
    ResolutionOverrides, ResolutionRequest, TypeReferenceResolver,
};
pub use snapshot::ProgramSnapshot;
pub use state::{ProcessedChanges, ProgramState};
