//! Turning user interaction into outbound messages.

use std::sync::Arc;

use boardcast_board::{Board, Layout};
use boardcast_protocol::{Coord, Handshake, Outbound};
use boardcast_transport::TransportError;
use tokio::sync::{mpsc, watch};

use crate::BoardcastError;

/// Queues messages for the session's writer task.
///
/// Sending never waits on the network and never goes through the effect
/// queue, so a click is reported even while an image fetch or a prompt is
/// holding the queue up. Messages leave in the order they were reported.
///
/// Clicks are only accepted on cells of the board as it was last
/// configured. Clones share that layout, and the executor replaces it
/// every time the board is rebuilt.
#[derive(Debug, Clone)]
pub struct InteractionReporter {
    outbound: mpsc::UnboundedSender<Outbound>,
    layout: Arc<watch::Sender<Layout>>,
}

impl InteractionReporter {
    /// Creates a reporter and the receiving end the writer drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let reporter = Self {
            outbound: tx,
            layout: Arc::new(watch::Sender::new(Board::default().layout())),
        };
        (reporter, rx)
    }

    /// Reports a click on the piece cell at `at`.
    ///
    /// # Errors
    /// [`GeometryError::OutOfBounds`](boardcast_board::GeometryError) if
    /// `at` is not on the current board, which includes every coordinate
    /// before the first `config`. Nothing is sent in that case.
    pub fn click(&self, at: Coord) -> Result<(), BoardcastError> {
        if let Err(e) = self.layout.borrow().check(at) {
            tracing::debug!(row = at.row, col = at.col, error = %e, "ignoring click");
            return Err(e.into());
        }
        tracing::debug!(row = at.row, col = at.col, "reporting click");
        Ok(self.send(Outbound::Click(at))?)
    }

    /// Reports the answer to an `askstring` prompt; `None` if dismissed.
    pub fn write(&self, answer: Option<String>) -> Result<(), TransportError> {
        tracing::debug!(dismissed = answer.is_none(), "reporting prompt answer");
        self.send(Outbound::Write(answer))
    }

    /// The board clicks are currently checked against.
    pub fn layout(&self) -> Layout {
        self.layout.borrow().clone()
    }

    /// A receiver that sees every rebuild of the board.
    pub fn watch_layout(&self) -> watch::Receiver<Layout> {
        self.layout.subscribe()
    }

    pub(crate) fn handshake(&self, handshake: Handshake) -> Result<(), TransportError> {
        self.send(Outbound::Handshake(handshake))
    }

    pub(crate) fn publish_layout(&self, layout: &Layout) {
        self.layout.send_replace(layout.clone());
    }

    /// `true` once the writer has gone away.
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }

    fn send(&self, msg: Outbound) -> Result<(), TransportError> {
        self.outbound
            .send(msg)
            .map_err(|_| TransportError::ConnectionClosed("outbound channel closed".into()))
    }
}
