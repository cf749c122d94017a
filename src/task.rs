//! Single-use background work, polled from the render thread.

use std::io;
use std::thread;

use thiserror::Error;
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::weather::FetchError;

#[derive(Debug, Error)]
pub enum TaskError<E> {
    #[error("task has not finished yet")]
    Incomplete,

    #[error("{0}")]
    Failed(E),

    #[error("task panicked before producing a result")]
    Panicked,
}

enum Slot<T, E> {
    Pending(oneshot::Receiver<Result<T, E>>),
    Succeeded(T),
    Failed(E),
    Panicked,
}

/// A unit of work running on its own thread. The worker writes its outcome into a
/// one-shot channel exactly once; the owner polls for it without blocking.
pub struct Task<T, E = FetchError> {
    slot: Slot<T, E>,
}

impl<T, E> Task<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Start `work` on a new thread immediately.
    pub fn spawn<F>(name: &str, work: F) -> io::Result<Self>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();

        thread::Builder::new()
            .name(format!("fetch-{}", name))
            .spawn(move || {
                // The receiver only goes away if the owning cell was dropped.
                let _ = sender.send(work());
            })?;

        Ok(Self {
            slot: Slot::Pending(receiver),
        })
    }

    /// True once the work has returned successfully.
    pub fn is_finished(&mut self) -> bool {
        self.poll();
        matches!(self.slot, Slot::Succeeded(_))
    }

    /// True once the work has returned an error or panicked.
    pub fn has_errored(&mut self) -> bool {
        self.poll();
        matches!(self.slot, Slot::Failed(_) | Slot::Panicked)
    }

    /// Consume the task and take its outcome.
    pub fn result(mut self) -> Result<T, TaskError<E>> {
        self.poll();
        match self.slot {
            Slot::Pending(_) => Err(TaskError::Incomplete),
            Slot::Succeeded(value) => Ok(value),
            Slot::Failed(err) => Err(TaskError::Failed(err)),
            Slot::Panicked => Err(TaskError::Panicked),
        }
    }

    fn poll(&mut self) {
        if let Slot::Pending(receiver) = &mut self.slot {
            self.slot = match receiver.try_recv() {
                Ok(Ok(value)) => Slot::Succeeded(value),
                Ok(Err(err)) => Slot::Failed(err),
                Err(TryRecvError::Empty) => return,
                // The sender is dropped without sending only when the worker unwinds.
                Err(TryRecvError::Closed) => Slot::Panicked,
            };
        }
    }
}
