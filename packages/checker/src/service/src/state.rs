use std::fmt;

/// Lifecycle of a checking service.
///
/// `Created` until the first iteration opens, then alternating between
/// `Ready` and `Checking`. `Failed` and `Disposed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    Created,
    Ready,
    Checking(IterationPhase),
    Failed,
    Disposed,
}

/// How far the open iteration has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IterationPhase {
    /// `next_iteration` returned; type checking has not run yet.
    Opened,
    /// Type checker issues were produced; linting may follow.
    TypeChecked,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceState::Created => write!(f, "created"),
            ServiceState::Ready => write!(f, "ready"),
            ServiceState::Checking(IterationPhase::Opened) => write!(f, "checking (opened)"),
            ServiceState::Checking(IterationPhase::TypeChecked) => write!(f, "checking (type checked)"),
            ServiceState::Failed => write!(f, "failed"),
            ServiceState::Disposed => write!(f, "disposed"),
        }
    }
}
