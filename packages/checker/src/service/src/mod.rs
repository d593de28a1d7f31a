pub mod report;
pub mod service;
pub mod state;

pub use report::IterationReport;
pub use service::CheckingService;
pub use state::{IterationPhase, ServiceState};
