use std::io;

/// What can go wrong on the client's connection to the game server.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint could not be reached, or refused the WebSocket upgrade.
    #[error("could not connect to {endpoint}: {source}")]
    ConnectFailed {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// The connection is gone; the string says why.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// A frame could not be written.
    #[error("failed to send frame: {0}")]
    SendFailed(#[source] io::Error),

    /// The stream produced an error instead of a frame.
    #[error("failed to receive frame: {0}")]
    ReceiveFailed(#[source] io::Error),
}
