//! Error types for the protocol layer.
//!
//! Each crate in boardcast defines its own error enum. When you see a
//! `ProtocolError`, you know the server sent something the client could
//! not turn into an [`Effect`](crate::Effect). The pipeline drops such a
//! message and keeps going.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an outbound message into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The message is not JSON, or not a `[name, args]` pair.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The effect name is not one the client knows how to apply.
    #[error("unknown effect {0:?}")]
    UnknownEffect(String),

    /// A `config` effect named a setting the client does not have.
    #[error("unknown config setting {0:?}")]
    UnknownSetting(String),

    /// The effect name is known but its arguments have the wrong
    /// arity or shape.
    #[error("malformed arguments for {effect}: {source}")]
    MalformedArgs {
        effect: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
