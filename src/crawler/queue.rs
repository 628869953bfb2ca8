//! Task type and the shared task queue
//!
//! The queue is unbounded and multi-producer, multi-consumer. Workers submit
//! child tasks without ever blocking, and any idle worker may pick up the next
//! task. Closing the queue drops its only sender, after which receivers drain
//! whatever is left and then see `None`.

use std::sync::{Mutex as StdMutex, PoisonError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

/// A unit of crawl work: a URL and the hops it may still take
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Absolute URL to process
    pub url: String,

    /// Remaining depth budget; below zero the task is a no-op
    pub remaining_depth: i32,
}

impl Task {
    pub fn new(url: impl Into<String>, remaining_depth: i32) -> Self {
        Self {
            url: url.into(),
            remaining_depth,
        }
    }

    /// Builds the task for a link discovered while handling `self`
    pub fn child(&self, url: impl Into<String>) -> Self {
        Self::new(url, self.remaining_depth - 1)
    }

    /// Returns true if this task must be dropped without side effects
    pub fn is_exhausted(&self) -> bool {
        self.remaining_depth < 0
    }
}

/// Error returned when sending to a closed queue
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("task queue is closed")]
pub struct QueueClosed(pub Task);

/// Unbounded multi-consumer task queue
#[derive(Debug)]
pub struct TaskQueue {
    sender: StdMutex<Option<UnboundedSender<Task>>>,
    receiver: Mutex<UnboundedReceiver<Task>>,
}

impl TaskQueue {
    /// Creates an empty, open queue
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sender: StdMutex::new(Some(tx)),
            receiver: Mutex::new(rx),
        }
    }

    /// Appends a task without waiting
    ///
    /// # Errors
    ///
    /// Returns the task back inside `QueueClosed` if the queue was closed.
    pub fn send(&self, task: Task) -> Result<(), QueueClosed> {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match sender.as_ref() {
            Some(tx) => tx.send(task).map_err(|e| QueueClosed(e.0)),
            None => Err(QueueClosed(task)),
        }
    }

    /// Waits for the next task
    ///
    /// Suspends while the queue is empty and open. Returns `None` once the
    /// queue is closed and every remaining task has been taken.
    pub async fn recv(&self) -> Option<Task> {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await
    }

    /// Closes the queue
    ///
    /// Returns true for the call that actually closed it; later calls are
    /// no-ops that return false.
    pub fn close(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    /// Returns true once `close` has been called
    pub fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
