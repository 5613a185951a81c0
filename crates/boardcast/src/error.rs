//! Unified error type for the Boardcast client.

use boardcast_board::GeometryError;
use boardcast_protocol::ProtocolError;
use boardcast_queue::QueueError;
use boardcast_transport::TransportError;

use crate::assets::FetchError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `boardcast` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BoardcastError {
    /// Connect, send or receive failed, or the connection is gone.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An inbound message could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A coordinate or board size the board can't accept.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// A piece image could not be loaded.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The effect queue stopped.
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Why a single effect could not be applied.
///
/// These never end the session: the queue worker logs them and moves on
/// to the next effect.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A prompt answer could not be handed to the writer.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<ExecError> for BoardcastError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::Geometry(e) => Self::Geometry(e),
            ExecError::Fetch(e) => Self::Fetch(e),
            ExecError::Transport(e) => Self::Transport(e),
        }
    }
}
