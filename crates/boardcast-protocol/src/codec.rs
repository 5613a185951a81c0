//! Byte-level encoding of wire messages.
//!
//! The decoder and the session only ever go through [`Codec`], so the
//! framing format is chosen in one place. The game server speaks JSON in
//! text frames, which is what [`JsonCodec`] produces and accepts.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Turns wire messages into bytes and back.
///
/// Decoded values own their data, so a receive buffer can be released as
/// soon as its message has been decoded.
pub trait Codec: Send + Sync + 'static {
    /// # Errors
    /// [`ProtocolError::Encode`] if `value` can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// # Errors
    /// [`ProtocolError::Decode`] if `data` is not a valid `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// JSON via `serde_json`.
///
/// ```rust
/// use boardcast_protocol::{Codec, JsonCodec, Outbound, Coord};
///
/// let bytes = JsonCodec.encode(&Outbound::Click(Coord::new(2, 5))).unwrap();
/// assert_eq!(bytes, br#"["click",[5,2]]"#);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
