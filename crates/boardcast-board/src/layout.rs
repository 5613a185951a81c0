//! Board layout: cell sizing, the two stylesheet rules, and tile parity.

use std::fmt;

use boardcast_protocol::Coord;

use crate::GeometryError;

/// Default overall canvas size, in viewport-height units.
pub const DEFAULT_CANVAS_BUDGET: u32 = 80;

// ---------------------------------------------------------------------------
// CellSize
// ---------------------------------------------------------------------------

/// The display size of one square cell, in viewport-height units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CellSize(pub u32);

impl CellSize {
    /// Fits a `rows × cols` board into a square canvas of `budget` units:
    /// `floor(min(budget / cols, budget / rows))`.
    ///
    /// Never returns zero: a board wider than the budget still gets
    /// one-unit cells.
    pub fn fit(budget: u32, rows: usize, cols: usize) -> Self {
        let longest = rows.max(cols).max(1);
        let size = (budget as usize) / longest;
        Self(size.max(1) as u32)
    }
}

impl fmt::Display for CellSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}vh", self.0)
    }
}

// ---------------------------------------------------------------------------
// Stylesheet
// ---------------------------------------------------------------------------

/// The two named style rules the board rewrites on every resize.
///
/// Rows (`tr`) get the cell size as their height, cells (`td`) get it as
/// their width, which keeps every cell square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stylesheet {
    pub row_height: CellSize,
    pub col_width: CellSize,
}

impl Stylesheet {
    pub const ROW_SELECTOR: &'static str = "tr";
    pub const CELL_SELECTOR: &'static str = "td";

    pub fn uniform(size: CellSize) -> Self {
        Self {
            row_height: size,
            col_width: size,
        }
    }

    /// Looks a rule up by selector, the way a host stylesheet would.
    pub fn rule(&self, selector: &str) -> Option<CellSize> {
        match selector {
            Self::ROW_SELECTOR => Some(self.row_height),
            Self::CELL_SELECTOR => Some(self.col_width),
            _ => None,
        }
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {{ height: {}; }}", Self::ROW_SELECTOR, self.row_height)?;
        write!(f, "{} {{ width: {}; }}", Self::CELL_SELECTOR, self.col_width)
    }
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// Checkerboard colouring of a piece-layer cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Light,
    Dark,
}

impl Tile {
    /// `(row + col)` odd is a light tile.
    pub fn at(at: Coord) -> Self {
        if (at.row + at.col) % 2 == 1 {
            Self::Light
        } else {
            Self::Dark
        }
    }

    /// The class name a host stylesheet styles this tile with.
    pub fn class(self) -> &'static str {
        match self {
            Self::Light => "whitetile",
            Self::Dark => "blacktile",
        }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Everything a rendering surface needs to rebuild its grids.
///
/// Produced by [`Board::configure`](crate::Board::configure). The
/// `generation` identifies this particular build of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub rows: usize,
    pub cols: usize,
    pub generation: u64,
    pub stylesheet: Stylesheet,
}

impl Layout {
    pub fn cell_size(&self) -> CellSize {
        self.stylesheet.col_width
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    /// Checks `at` against these dimensions. A layout with no cells
    /// rejects every coordinate.
    pub fn check(&self, at: Coord) -> Result<(), GeometryError> {
        if self.contains(at) {
            Ok(())
        } else {
            Err(GeometryError::OutOfBounds {
                at,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Tile parity of the piece cell at `at`.
    pub fn tile(&self, at: Coord) -> Tile {
        Tile::at(at)
    }

    /// Every coordinate on the board, row by row.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.cols).map(move |col| Coord::new(row, col)))
    }
}
