//! Serial callback queue
//!
//! Delegate notifications are dispatched onto a dedicated Tokio task that
//! runs one job at a time, separate from the coordinator's state lock.

use crate::error::{Error, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a single-consumer job queue
///
/// Clones feed the same task, so jobs submitted through any clone run in
/// submission order. The task exits once every handle is dropped.
#[derive(Debug, Clone)]
pub struct CallbackQueue {
    sender: mpsc::UnboundedSender<Job>,
}

impl CallbackQueue {
    /// Spawn the consumer task on the current Tokio runtime
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, like [`tokio::spawn`].
    pub fn spawn() -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                job();
            }
            debug!("callback queue closed");
        });

        Self { sender }
    }

    /// Run `f` on the queue and wait for its result
    ///
    /// A panic inside `f` is contained and reported as [`Error::Callback`];
    /// the queue keeps serving later jobs.
    pub async fn run<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(f));
            let _ = tx.send(result);
        });

        self.sender
            .send(job)
            .map_err(|_| Error::callback("callback queue is closed"))?;

        match rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(Error::callback(format!(
                "callback panicked: {}",
                panic_message(payload.as_ref())
            ))),
            Err(_) => Err(Error::callback("callback job was dropped")),
        }
    }

    /// True once the consumer task has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
