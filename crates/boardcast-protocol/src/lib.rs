//! Wire protocol for boardcast.
//!
//! This crate defines the "language" the client and the game server speak:
//!
//! - **Types** ([`Effect`], [`Outbound`], [`Coord`], etc.): what travels
//!   on the wire, in the client's internal shape.
//! - **Decoder** ([`EffectDecoder`]): inbound `[name, args]` messages
//!   into typed effects.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the effect
//! pipeline. It doesn't know about the board or the queue; it only knows
//! how to read and write messages.
//!
//! ```text
//! Transport (bytes) → Protocol (Effect) → Queue → Executor → Board
//! ```

mod codec;
mod decode;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use decode::{EffectDecoder, from_wire};
pub use error::ProtocolError;
pub use types::{Coord, Effect, Handshake, Outbound, Setting, WireCoord};
