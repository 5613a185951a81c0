//! Board model for boardcast.
//!
//! The board is two stacked `rows × cols` grids: pieces underneath,
//! annotations (the overlay) on top. This crate owns:
//!
//! - [`Board`]: the grids, resizing, bounds checks, stale references
//! - [`Layout`] / [`Stylesheet`] / [`Tile`]: what a resize tells the
//!   surface: dimensions, cell size, checkerboard parity
//! - [`Surface`]: the interface a renderer implements
//! - [`MemorySurface`] / [`Frame`]: an in-memory renderer
//!
//! # How it fits in the stack
//!
//! ```text
//! Executor (above)  ← mutates the board one effect at a time
//!     ↕
//! Board (this crate)  ← validates geometry, mirrors changes to a Surface
//!     ↕
//! Protocol (below)  ← provides Coord
//! ```

mod board;
mod error;
mod layout;
mod surface;

pub use board::{Board, CellContent, CellRef, Layer};
pub use error::GeometryError;
pub use layout::{CellSize, DEFAULT_CANVAS_BUDGET, Layout, Stylesheet, Tile};
pub use surface::{Frame, MemorySurface, Surface, SurfaceEvent};
