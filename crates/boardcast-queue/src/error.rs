//! Error types for the queue.

/// Errors that can occur when talking to the queue.
///
/// A failing *task* is not a queue error: the worker logs it and moves
/// on. These only describe the queue itself going away.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The worker has stopped, so nothing more can be enqueued.
    #[error("queue is closed")]
    Closed,

    /// The worker task itself died (outside any task it was running).
    #[error("queue worker stopped abnormally: {0}")]
    WorkerLost(String),
}
