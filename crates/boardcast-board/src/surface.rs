//! The rendering surface interface, plus an in-memory implementation.
//!
//! The executor owns the [`Board`](crate::Board) and mirrors every change
//! onto a [`Surface`]: a browser page, a terminal, or a test recorder.
//! Surfaces only ever see coordinates the board already validated.

use std::sync::{Arc, Mutex, PoisonError};

use boardcast_protocol::Coord;

use crate::{CellContent, Layer, Layout};

/// Something that can show the board.
///
/// All methods are synchronous. Anything slow (fetching images) has
/// already happened by the time the surface is asked to paint.
pub trait Surface: Send + 'static {
    /// Throw away both grids and build new ones for `layout`.
    fn rebuild(&mut self, layout: &Layout);

    /// Replace one cell's content.
    fn paint(&mut self, layer: Layer, at: Coord, content: &CellContent);

    /// Replace the status region. `markup` is shown verbatim.
    fn set_status(&mut self, markup: &str);
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// A plain copy of everything visible: both layers and the status line.
///
/// `Frame` is itself a [`Surface`], so any host that wants to keep the
/// current picture around can delegate to one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub layout: Option<Layout>,
    pub status: String,
    pieces: Vec<CellContent>,
    overlay: Vec<CellContent>,
}

impl Frame {
    /// Content of the cell at `at`, if the frame has one there.
    pub fn cell(&self, layer: Layer, at: Coord) -> Option<&CellContent> {
        let layout = self.layout.as_ref()?;
        if !layout.contains(at) {
            return None;
        }
        let index = at.row * layout.cols + at.col;
        match layer {
            Layer::Pieces => self.pieces.get(index),
            Layer::Overlay => self.overlay.get(index),
        }
    }

    pub fn piece(&self, at: Coord) -> Option<&CellContent> {
        self.cell(Layer::Pieces, at)
    }

    pub fn overlay(&self, at: Coord) -> Option<&CellContent> {
        self.cell(Layer::Overlay, at)
    }
}

impl Surface for Frame {
    fn rebuild(&mut self, layout: &Layout) {
        let cells = layout.rows * layout.cols;
        self.pieces = vec![CellContent::Empty; cells];
        self.overlay = vec![CellContent::Empty; cells];
        self.layout = Some(layout.clone());
    }

    fn paint(&mut self, layer: Layer, at: Coord, content: &CellContent) {
        let Some(layout) = &self.layout else {
            return;
        };
        if !layout.contains(at) {
            return;
        }
        let index = at.row * layout.cols + at.col;
        let grid = match layer {
            Layer::Pieces => &mut self.pieces,
            Layer::Overlay => &mut self.overlay,
        };
        if let Some(cell) = grid.get_mut(index) {
            *cell = content.clone();
        }
    }

    fn set_status(&mut self, markup: &str) {
        self.status = markup.to_string();
    }
}

// ---------------------------------------------------------------------------
// MemorySurface
// ---------------------------------------------------------------------------

/// One call made on a surface, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Rebuilt { rows: usize, cols: usize, generation: u64 },
    Painted { layer: Layer, at: Coord, content: CellContent },
    Status(String),
}

#[derive(Debug, Default)]
struct Recorded {
    frame: Frame,
    history: Vec<SurfaceEvent>,
}

/// A surface that keeps the current [`Frame`] and the full call history.
///
/// Cloning gives another handle to the same state, so one clone can be
/// handed to the client while another is used to look at the result.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    inner: Arc<Mutex<Recorded>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of what is currently shown.
    pub fn snapshot(&self) -> Frame {
        self.with(|r| r.frame.clone())
    }

    /// Every call made so far, oldest first.
    pub fn history(&self) -> Vec<SurfaceEvent> {
        self.with(|r| r.history.clone())
    }

    pub fn status(&self) -> String {
        self.with(|r| r.frame.status.clone())
    }

    fn with<T>(&self, f: impl FnOnce(&mut Recorded) -> T) -> T {
        // A panic while holding the lock can't leave `Recorded` half
        // written in a way that matters for reading it back.
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }
}

impl Surface for MemorySurface {
    fn rebuild(&mut self, layout: &Layout) {
        self.with(|r| {
            r.frame.rebuild(layout);
            r.history.push(SurfaceEvent::Rebuilt {
                rows: layout.rows,
                cols: layout.cols,
                generation: layout.generation,
            });
        });
    }

    fn paint(&mut self, layer: Layer, at: Coord, content: &CellContent) {
        self.with(|r| {
            r.frame.paint(layer, at, content);
            r.history.push(SurfaceEvent::Painted {
                layer,
                at,
                content: content.clone(),
            });
        });
    }

    fn set_status(&mut self, markup: &str) {
        self.with(|r| {
            r.frame.set_status(markup);
            r.history.push(SurfaceEvent::Status(markup.to_string()));
        });
    }
}
