//! Strictly ordered asynchronous task queue for Boardcast.
//!
//! Every effect the server sends becomes one task on an [`OrderedQueue`].
//! A single worker runs the tasks in arrival order, awaiting each one to
//! completion before starting the next, no matter how long it suspends.
//! A task that fails or panics is logged and skipped over.
//!
//! # Key types
//!
//! - [`Handler`]: what the worker calls for each item
//! - [`OrderedQueue`]: producer handle, `enqueue` never blocks
//! - [`QueueWorker`]: join handle yielding [`QueueStats`]
//! - [`QueueError`]: the queue itself is gone

mod error;
mod queue;

pub use error::QueueError;
pub use queue::{Handler, OrderedQueue, QueueStats, QueueWorker};
