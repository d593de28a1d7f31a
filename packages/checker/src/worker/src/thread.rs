// Thread Worker
//
// Runs a checking service on its own thread. The host talks to it through
// channels only; a panic inside the service ends the thread and reaches the
// host as `WorkerEvent::Died`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::protocol::{WorkerGone, WorkerResponse};
use crate::cancellation::CancellationToken;
use crate::error::Result;
use crate::service::CheckingService;

enum Command {
    Iterate(CancellationToken),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Response(WorkerResponse),
    /// The worker stopped without being asked to.
    Died(String),
}

pub struct CheckerWorker {
    commands: Sender<Command>,
    events: Receiver<WorkerEvent>,
    handle: Option<JoinHandle<()>>,
    live_token: Option<CancellationToken>,
}

impl CheckerWorker {
    /// Start a worker thread that builds its service with `factory`.
    pub fn spawn<F>(factory: F) -> Self
    where
        F: FnOnce() -> Result<CheckingService> + Send + 'static,
    {
        let (commands, command_receiver) = mpsc::channel();
        let (event_sender, events) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("checker-worker".to_string())
            .spawn(move || run(factory, command_receiver, event_sender))
            .ok();

        if handle.is_none() {
            tracing::error!("failed to spawn checker worker thread");
        }

        Self {
            commands,
            events,
            handle,
            live_token: None,
        }
    }

    /// Ask for a new iteration. The token of the previous request is
    /// cancelled first, so at most one pass is live at any time.
    pub fn request_iteration(&mut self) -> std::result::Result<CancellationToken, WorkerGone> {
        if let Some(previous) = self.live_token.take() {
            previous.request_cancellation();
        }

        let token = CancellationToken::new();
        self.commands
            .send(Command::Iterate(token.clone()))
            .map_err(|_| WorkerGone)?;
        self.live_token = Some(token.clone());
        Ok(token)
    }

    /// Block until the worker answers.
    pub fn recv(&self) -> WorkerEvent {
        self.events
            .recv()
            .unwrap_or_else(|_| WorkerEvent::Died("worker thread exited".to_string()))
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(WorkerEvent::Died("worker thread exited".to_string())),
        }
    }

    /// Stop the worker and wait for its thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(token) = self.live_token.take() {
            token.request_cancellation();
        }
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("checker worker thread panicked during shutdown");
            }
        }
    }
}

impl Drop for CheckerWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<F>(factory: F, commands: Receiver<Command>, events: Sender<WorkerEvent>)
where
    F: FnOnce() -> Result<CheckingService>,
{
    let mut service = match panic::catch_unwind(AssertUnwindSafe(factory)) {
        Ok(Ok(service)) => Ok(service),
        Ok(Err(error)) => {
            tracing::error!(%error, "failed to create checking service");
            Err(error)
        }
        Err(payload) => {
            let _ = events.send(WorkerEvent::Died(panic_message(payload.as_ref())));
            return;
        }
    };

    while let Ok(command) = commands.recv() {
        let token = match command {
            Command::Iterate(token) => token,
            Command::Shutdown => break,
        };

        let service = match service.as_mut() {
            Ok(service) => service,
            Err(error) => {
                if events.send(WorkerEvent::Response(WorkerResponse::failed(error))).is_err() {
                    break;
                }
                continue;
            }
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| service.run_iteration_with_token(&token)));
        let event = match outcome {
            Ok(result) => WorkerEvent::Response(WorkerResponse::from_result(result)),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(%message, "checking service panicked");
                let _ = events.send(WorkerEvent::Died(message));
                return;
            }
        };
        if events.send(event).is_err() {
            break;
        }
    }

    if let Ok(service) = service.as_mut() {
        service.dispose();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "checking service panicked".to_string()
    }
}

impl std::fmt::Debug for CheckerWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckerWorker")
            .field("running", &self.handle.is_some())
            .finish_non_exhaustive()
    }
}
