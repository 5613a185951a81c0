//! Error types for the board model.

use boardcast_protocol::Coord;

/// Errors raised when an effect's geometry doesn't fit the board.
///
/// None of these are fatal: the executor drops the effect and logs it.
/// What matters is that nothing is ever indexed outside the grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// The coordinate lies outside the current dimensions (or the board
    /// hasn't been configured yet, which makes every coordinate invalid).
    #[error("{at} is outside the {rows}x{cols} board")]
    OutOfBounds { at: Coord, rows: usize, cols: usize },

    /// A [`CellRef`](crate::CellRef) issued before the last resize.
    #[error(
        "cell reference from board generation {held} used on generation {current}"
    )]
    Stale { held: u64, current: u64 },

    /// `configure` was asked for a board with no cells.
    #[error("board dimensions must be non-zero, got {rows}x{cols}")]
    EmptyBoard { rows: usize, cols: usize },

    /// `configure` was asked for a side longer than the board supports.
    #[error("board side {requested} exceeds the maximum of {max}")]
    TooLarge { requested: usize, max: usize },
}
