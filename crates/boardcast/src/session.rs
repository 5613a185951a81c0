//! One connection to the game server, from handshake to close.
//!
//! A session runs three tasks:
//!   1. the reader: receive → decode → enqueue, never waiting on effects
//!   2. the queue worker: runs effects one at a time (see `boardcast-queue`)
//!   3. the writer: drains the outbound channel into the connection
//!
//! When the server closes the connection the reader enqueues a
//! [`QueuedTask::Closed`] notice behind everything already received, closes
//! the queue, and waits for the worker to drain.

use std::sync::Arc;

use boardcast_protocol::{Codec, EffectDecoder, Handshake, JsonCodec, Outbound};
use boardcast_queue::{Handler, OrderedQueue, QueueError, QueueStats, QueueWorker};
use boardcast_transport::{Connection, ConnectionId, ConnectionState};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::BoardcastError;
use crate::executor::QueuedTask;
use crate::reporter::InteractionReporter;

// ---------------------------------------------------------------------------
// LaunchContext
// ---------------------------------------------------------------------------

/// Who is joining which game: the three launch parameters forwarded to
/// the server in the handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchContext {
    pub room: Option<String>,
    pub mode: Option<String>,
    pub user: Option<String>,
}

impl LaunchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Reads `room`, `mode` and `user` from a URL query string such as
    /// `?room=lobby&mode=chess&user=ann+lee`.
    ///
    /// Values are form-decoded. The first occurrence of a key wins; other
    /// keys are ignored.
    pub fn from_query(query: &str) -> Self {
        let mut ctx = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "room" => &mut ctx.room,
                "mode" => &mut ctx.mode,
                "user" => &mut ctx.user,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        ctx
    }

    /// The identification message sent when the connection opens.
    pub fn handshake(&self) -> Handshake {
        Handshake {
            room: self.room.clone(),
            mode: self.mode.clone(),
            user: self.user.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A running connection to the game server.
pub struct Session<C: Connection> {
    conn: Arc<C>,
    reporter: InteractionReporter,
    state: watch::Receiver<ConnectionState>,
    reader: JoinHandle<Result<QueueStats, QueueError>>,
    writer: JoinHandle<()>,
}

impl<C: Connection> Session<C> {
    /// Starts a session over an open connection.
    ///
    /// The handshake is the first message queued for the writer, ahead of
    /// anything `make_handler`'s reporter clone could send. `make_handler`
    /// builds the effect handler; it receives a reporter so it can send
    /// prompt answers.
    pub fn start<H, F>(conn: C, handshake: Handshake, make_handler: F) -> Self
    where
        H: Handler<QueuedTask>,
        F: FnOnce(InteractionReporter) -> H,
    {
        let conn = Arc::new(conn);
        let (state_tx, state) = watch::channel(ConnectionState::Connecting);
        let (reporter, outbound) = InteractionReporter::channel();

        // The writer is alive until `outbound` is dropped, so this can't fail.
        let _ = reporter.handshake(handshake);
        transition(&state_tx, ConnectionState::Open);
        tracing::info!(conn_id = %conn.id(), "handshake queued");

        let writer = tokio::spawn(write_loop(Arc::clone(&conn), outbound));

        let (queue, worker) = OrderedQueue::spawn(make_handler(reporter.clone()));
        let reader = tokio::spawn(read_loop(Arc::clone(&conn), queue, worker, state_tx));

        Self {
            conn,
            reporter,
            state,
            reader,
            writer,
        }
    }

    /// A handle for reporting clicks.
    pub fn reporter(&self) -> InteractionReporter {
        self.reporter.clone()
    }

    pub fn id(&self) -> ConnectionId {
        self.conn.id()
    }

    /// The connection's current state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// A receiver that sees every state change.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Closes the connection from this side. The session still drains
    /// every effect received so far; use [`wait`](Self::wait) to see it
    /// finish.
    pub async fn shutdown(&self) -> Result<(), C::Error> {
        self.conn.close().await
    }

    /// Waits for the server to close the connection and for every
    /// received effect to be applied.
    pub async fn wait(self) -> Result<QueueStats, BoardcastError> {
        let result = self
            .reader
            .await
            .map_err(|e| QueueError::WorkerLost(e.to_string()))
            .and_then(|stats| stats);
        self.writer.abort();
        Ok(result?)
    }
}

fn transition(state: &watch::Sender<ConnectionState>, next: ConnectionState) {
    state.send_if_modified(|current| {
        if current.can_transition_to(next) {
            tracing::debug!(from = %current, to = %next, "connection state");
            *current = next;
            true
        } else {
            false
        }
    });
}

/// Receives, decodes and enqueues until the connection ends, then drains
/// the queue.
async fn read_loop<C: Connection>(
    conn: Arc<C>,
    queue: OrderedQueue<QueuedTask>,
    worker: QueueWorker,
    state: watch::Sender<ConnectionState>,
) -> Result<QueueStats, QueueError> {
    let conn_id = conn.id();
    let decoder = EffectDecoder::new();

    let reason = loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => break "closed by server".to_string(),
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "receive failed");
                break e.to_string();
            }
        };

        let effect = match decoder.decode(&data) {
            Ok(effect) => effect,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "dropping undecodable message");
                continue;
            }
        };

        let effect_name = effect.name();
        match queue.enqueue(QueuedTask::Apply(effect)) {
            Ok(seq) => tracing::debug!(%conn_id, seq, effect = effect_name, "effect queued"),
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "effect queue gone");
                break e.to_string();
            }
        }
    };

    transition(&state, ConnectionState::Closed);
    tracing::info!(%conn_id, %reason, "connection closed, draining effects");

    if let Err(e) = queue.enqueue(QueuedTask::Closed { reason }) {
        tracing::warn!(%conn_id, error = %e, "could not queue close notice");
    }
    queue.close();
    drop(queue);

    let stats = worker.join().await?;
    tracing::info!(
        %conn_id,
        completed = stats.completed,
        failed = stats.failed,
        "session finished"
    );
    Ok(stats)
}

/// Sends every outbound message in the order it was reported.
async fn write_loop<C: Connection>(conn: Arc<C>, mut outbound: mpsc::UnboundedReceiver<Outbound>) {
    let conn_id = conn.id();
    let codec = JsonCodec;

    while let Some(msg) = outbound.recv().await {
        let bytes = match codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode outbound message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::warn!(%conn_id, error = %e, "send failed, writer stopping");
            break;
        }
    }
}
