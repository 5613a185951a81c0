//! Core protocol types for boardcast's wire format.
//!
//! Inbound, the server sends effects: `[name, args]` pairs that tell the
//! client what to show. Outbound, the client sends exactly three kinds of
//! message: the handshake object, clicks, and prompt answers.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A board position in row-major order, zero-based.
///
/// This is the only coordinate type the client works with internally.
/// The wire uses column-first pairs ([`WireCoord`]); the conversion
/// between the two lives here and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A coordinate as it travels on the wire: `[col, row]`.
///
/// Tuple structs serialize as JSON arrays, so `WireCoord(5, 2)` is
/// `[5, 2]`: column 5, row 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCoord(pub usize, pub usize);

impl From<WireCoord> for Coord {
    fn from(WireCoord(col, row): WireCoord) -> Self {
        Coord { row, col }
    }
}

impl From<Coord> for WireCoord {
    fn from(at: Coord) -> Self {
        WireCoord(at.col, at.row)
    }
}

// ---------------------------------------------------------------------------
// Effects (server → client)
// ---------------------------------------------------------------------------

/// A board setting carried by the `config` effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    /// Rebuild the board with the given dimensions.
    BoardSize { rows: usize, cols: usize },
}

/// One server-directed instruction to change what the client shows.
///
/// Every inbound message decodes into exactly one of these. Coordinates
/// are already in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Paint a piece. `glyph` is either literal text or the name of an
    /// image asset (`"pawn.svg"`). An empty glyph clears the cell.
    DrawPiece {
        at: Coord,
        glyph: String,
        colour: String,
    },

    /// Change a board setting.
    Configure(Setting),

    /// Replace the status line. The text may contain markup.
    SetStatus(String),

    /// Write text into the overlay layer. Empty text clears the cell.
    SetOverlay {
        at: Coord,
        text: String,
        colour: String,
    },

    /// Ask the user for a line of text and send it back as `write`.
    AskString(String),
}

impl Effect {
    pub const DRAW_PIECE: &'static str = "draw_piece";
    pub const CONFIG: &'static str = "config";
    pub const STATUS: &'static str = "status";
    pub const OVERLAY: &'static str = "overlay";
    pub const ASK_STRING: &'static str = "askstring";

    /// The wire name of this effect, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DrawPiece { .. } => Self::DRAW_PIECE,
            Self::Configure(_) => Self::CONFIG,
            Self::SetStatus(_) => Self::STATUS,
            Self::SetOverlay { .. } => Self::OVERLAY,
            Self::AskString(_) => Self::ASK_STRING,
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound (client → server)
// ---------------------------------------------------------------------------

/// The identification object sent once when the connection opens.
///
/// Missing launch parameters are forwarded as `null`; the server decides
/// what to do with them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handshake {
    pub room: Option<String>,
    pub mode: Option<String>,
    pub user: Option<String>,
}

/// A message the client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// `{"room": …, "mode": …, "user": …}`
    Handshake(Handshake),
    /// `["click", [col, row]]`
    Click(Coord),
    /// `["write", answer]`; `None` means the prompt was dismissed and
    /// goes out as `null`.
    Write(Option<String>),
}

impl Serialize for Outbound {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Handshake(handshake) => handshake.serialize(s),
            Self::Click(at) => ("click", WireCoord::from(*at)).serialize(s),
            Self::Write(answer) => ("write", answer).serialize(s),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
