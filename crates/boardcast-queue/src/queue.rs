//! The ordered queue: a FIFO channel drained by exactly one worker task.
//!
//! Producers hold an [`OrderedQueue`] handle and push items with
//! [`enqueue`](OrderedQueue::enqueue), which never waits. The worker owns
//! the [`Handler`] and runs one item at a time, awaiting each to the end
//! before taking the next from the channel. That single loop is the whole
//! ordering guarantee: there is never a second place where items run.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use futures_util::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::QueueError;

/// Runs the items of an [`OrderedQueue`].
///
/// `handle` may suspend for as long as it likes (a network fetch, a user
/// prompt); the next item waits. An `Err` or a panic is logged and the
/// worker carries on with the next item.
pub trait Handler<T>: Send + 'static {
    /// What a failed item reports. Only ever displayed in logs.
    type Error: std::fmt::Display + Send;

    /// Runs one item. `seq` is its position in arrival order, from 1.
    fn handle(
        &mut self,
        seq: u64,
        item: T,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// What went through the worker before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Items whose handler returned `Ok`.
    pub completed: u64,
    /// Items whose handler returned `Err` or panicked.
    pub failed: u64,
}

/// What travels through the channel.
enum Slot<T> {
    Task { seq: u64, item: T },
    /// Resolves once everything ahead of it has run.
    Flush(oneshot::Sender<()>),
    /// Stop taking new items; run what is already queued.
    Close,
}

/// Handle for pushing items onto the queue.
///
/// Cheap to clone; every clone feeds the same worker. The worker drains
/// what is left and stops once every handle has been dropped.
pub struct OrderedQueue<T> {
    sender: mpsc::UnboundedSender<Slot<T>>,
    next_seq: Arc<AtomicU64>,
    pending: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl<T> Clone for OrderedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            next_seq: Arc::clone(&self.next_seq),
            pending: Arc::clone(&self.pending),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<T: Send + 'static> OrderedQueue<T> {
    /// Spawns the worker on the current Tokio runtime and returns the
    /// producer handle together with the worker's handle.
    pub fn spawn<H: Handler<T>>(handler: H) -> (Self, QueueWorker) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));

        let worker = tokio::spawn(run(handler, rx, Arc::clone(&pending)));

        let queue = Self {
            sender: tx,
            next_seq: Arc::new(AtomicU64::new(1)),
            pending,
            closed: Arc::new(AtomicBool::new(false)),
        };
        (queue, QueueWorker { handle: worker })
    }

    /// Appends `item` to the tail and returns its sequence number.
    ///
    /// Never blocks and never waits for earlier items to run.
    ///
    /// # Errors
    /// [`QueueError::Closed`] after [`close`](Self::close) or once the
    /// worker is gone.
    pub fn enqueue(&self, item: T) -> Result<u64, QueueError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(QueueError::Closed);
        }
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        // Count before sending so the worker can't decrement first.
        self.pending.fetch_add(1, Ordering::AcqRel);
        if self.sender.send(Slot::Task { seq, item }).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(QueueError::Closed);
        }
        tracing::trace!(seq, "task enqueued");
        Ok(seq)
    }

    /// Resolves once every item enqueued before this call has finished.
    ///
    /// The barrier goes into the queue when `flush` is called, not when the
    /// returned future is first polled, so items enqueued in between are
    /// not waited for.
    ///
    /// # Errors
    /// [`QueueError::Closed`] if the worker stopped first.
    pub fn flush(&self) -> impl Future<Output = Result<(), QueueError>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        let placed = self.sender.send(Slot::Flush(tx)).is_ok();
        async move {
            if !placed {
                return Err(QueueError::Closed);
            }
            rx.await.map_err(|_| QueueError::Closed)
        }
    }

    /// Stops admitting items on every handle. Items already queued still
    /// run, after which the worker exits and [`QueueWorker::join`]
    /// resolves. Closing twice is a no-op.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            let _ = self.sender.send(Slot::Close);
        }
    }

    /// Items admitted but not finished yet, including the running one.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// `true` once the queue has stopped accepting items.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.sender.is_closed()
    }
}

/// Handle to the running worker task.
#[derive(Debug)]
pub struct QueueWorker {
    handle: JoinHandle<QueueStats>,
}

impl QueueWorker {
    /// Waits for the worker to drain and stop. It stops after
    /// [`OrderedQueue::close`] or once every handle has been dropped.
    pub async fn join(self) -> Result<QueueStats, QueueError> {
        self.handle
            .await
            .map_err(|e| QueueError::WorkerLost(e.to_string()))
    }

    /// Stops the worker without draining. Items still queued never run.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// The worker loop.
async fn run<T, H>(
    mut handler: H,
    mut receiver: mpsc::UnboundedReceiver<Slot<T>>,
    pending: Arc<AtomicUsize>,
) -> QueueStats
where
    T: Send + 'static,
    H: Handler<T>,
{
    tracing::debug!("queue worker started");
    let mut stats = QueueStats::default();

    while let Some(slot) = receiver.recv().await {
        match slot {
            Slot::Task { seq, item } => {
                let outcome = AssertUnwindSafe(handler.handle(seq, item))
                    .catch_unwind()
                    .await;
                match outcome {
                    Ok(Ok(())) => {
                        stats.completed += 1;
                        tracing::trace!(seq, "task finished");
                    }
                    Ok(Err(e)) => {
                        stats.failed += 1;
                        tracing::warn!(seq, error = %e, "task failed, continuing");
                    }
                    Err(panic) => {
                        stats.failed += 1;
                        tracing::warn!(
                            seq,
                            panic = panic_message(&*panic),
                            "task panicked, continuing"
                        );
                    }
                }
                pending.fetch_sub(1, Ordering::AcqRel);
            }
            Slot::Flush(reply) => {
                let _ = reply.send(());
            }
            Slot::Close => {
                tracing::debug!("queue closed, draining");
                receiver.close();
            }
        }
    }

    tracing::debug!(
        completed = stats.completed,
        failed = stats.failed,
        "queue worker stopped"
    );
    stats
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
