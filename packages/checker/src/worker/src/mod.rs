pub mod protocol;
pub mod serve;
pub mod thread;

pub use protocol::{WorkerGone, WorkerRequest, WorkerResponse};
pub use serve::serve;
pub use thread::{CheckerWorker, WorkerEvent};
