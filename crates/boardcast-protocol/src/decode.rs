//! The effect decoder: raw inbound bytes → [`Effect`].
//!
//! Decoding is pure validation and reshaping. It never touches the board,
//! so a bad message costs nothing but a log line.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Codec, Coord, Effect, JsonCodec, ProtocolError, Setting, WireCoord};

/// The outer shape of every inbound message: `[name, args]`.
///
/// A two-field tuple struct deserializes from a two-element array and
/// rejects anything longer or shorter.
#[derive(Deserialize)]
struct RawEffect(String, Value);

/// The only setting key the server sends today.
const BOARD_SIZE: &str = "board_size";

/// Turns inbound messages into typed effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectDecoder {
    codec: JsonCodec,
}

impl EffectDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes one message into exactly one effect.
    ///
    /// # Errors
    /// - [`ProtocolError::Decode`]: not a `[name, args]` pair
    /// - [`ProtocolError::UnknownEffect`]: name not recognized
    /// - [`ProtocolError::UnknownSetting`]: `config` with an unknown key
    /// - [`ProtocolError::MalformedArgs`]: args of the wrong shape
    pub fn decode(&self, data: &[u8]) -> Result<Effect, ProtocolError> {
        let RawEffect(name, args) = self.codec.decode(data)?;
        from_wire(&name, args)
    }
}

/// Builds an [`Effect`] from an already-split `[name, args]` pair.
pub fn from_wire(name: &str, args: Value) -> Result<Effect, ProtocolError> {
    match name {
        Effect::DRAW_PIECE => {
            let (at, glyph, colour): (WireCoord, String, String) =
                args_of(Effect::DRAW_PIECE, args)?;
            Ok(Effect::DrawPiece {
                at: Coord::from(at),
                glyph,
                colour,
            })
        }
        Effect::CONFIG => {
            let (key, value): (String, Value) = args_of(Effect::CONFIG, args)?;
            match key.as_str() {
                BOARD_SIZE => {
                    // Same column-first convention as coordinates.
                    let (cols, rows): (usize, usize) =
                        args_of(Effect::CONFIG, value)?;
                    Ok(Effect::Configure(Setting::BoardSize { rows, cols }))
                }
                _ => Err(ProtocolError::UnknownSetting(key)),
            }
        }
        Effect::STATUS => Ok(Effect::SetStatus(args_of(Effect::STATUS, args)?)),
        Effect::OVERLAY => {
            let (at, text, colour): (WireCoord, String, String) =
                args_of(Effect::OVERLAY, args)?;
            Ok(Effect::SetOverlay {
                at: Coord::from(at),
                text,
                colour,
            })
        }
        Effect::ASK_STRING => {
            Ok(Effect::AskString(args_of(Effect::ASK_STRING, args)?))
        }
        other => Err(ProtocolError::UnknownEffect(other.to_string())),
    }
}

fn args_of<T: DeserializeOwned>(
    effect: &'static str,
    args: Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(args)
        .map_err(|source| ProtocolError::MalformedArgs { effect, source })
}
