//! The board model: two parallel grids addressed by row and column.
//!
//! The board owns every cell. Outsiders either address cells by
//! coordinate (checked against the current dimensions on every call) or
//! hold a [`CellRef`], which remembers which build of the board it came
//! from. Resizing throws both grids away and bumps the generation, so a
//! reference taken before the resize can never write into the new grid.

use boardcast_protocol::Coord;

use crate::{CellSize, GeometryError, Layout, Stylesheet, layout::DEFAULT_CANVAS_BUDGET};

/// Which of the two stacked grids a cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Pieces, drawn by `draw_piece`. Clicks are reported from here.
    Pieces,
    /// Annotations drawn over the pieces, e.g. valid-move markers.
    Overlay,
}

/// What a single cell currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CellContent {
    #[default]
    Empty,
    /// Styled text; `colour` is the text colour.
    Text { text: String, colour: String },
    /// Image markup fetched from the asset store; `fill` is applied as the
    /// image's fill attribute.
    Image { markup: String, fill: String },
}

impl CellContent {
    /// Text content, or `Empty` when `text` is empty.
    pub fn text(text: impl Into<String>, colour: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Self::Empty
        } else {
            Self::Text {
                text,
                colour: colour.into(),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A handle to one cell of one build of the board.
///
/// Cheap to copy. Resolving it after a resize fails with
/// [`GeometryError::Stale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    layer: Layer,
    at: Coord,
    generation: u64,
}

/// One layer's cells, stored row-major in a flat vector.
#[derive(Debug, Clone, Default)]
struct Grid {
    cols: usize,
    cells: Vec<CellContent>,
}

impl Grid {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            cells: vec![CellContent::Empty; rows * cols],
        }
    }

    fn index(&self, at: Coord) -> usize {
        at.row * self.cols + at.col
    }
}

/// The two-layer board.
///
/// Starts out with no cells at all; the first `configure` creates them.
#[derive(Debug, Clone)]
pub struct Board {
    rows: usize,
    cols: usize,
    generation: u64,
    canvas_budget: u32,
    stylesheet: Stylesheet,
    pieces: Grid,
    overlay: Grid,
}

impl Board {
    /// Longest side `configure` accepts.
    pub const MAX_SIDE: usize = 256;

    /// Creates an empty, unconfigured board that sizes its cells to fit
    /// `canvas_budget` viewport units.
    pub fn new(canvas_budget: u32) -> Self {
        Self {
            rows: 0,
            cols: 0,
            generation: 0,
            canvas_budget,
            stylesheet: Stylesheet::uniform(CellSize(canvas_budget.max(1))),
            pieces: Grid::default(),
            overlay: Grid::default(),
        }
    }

    /// Discards both grids and builds fresh `rows × cols` ones.
    ///
    /// Recomputes the cell size, rewrites the `tr`/`td` rules and bumps
    /// the generation. Every [`CellRef`] issued before this call is stale
    /// afterwards.
    pub fn configure(
        &mut self,
        rows: usize,
        cols: usize,
    ) -> Result<Layout, GeometryError> {
        if rows == 0 || cols == 0 {
            return Err(GeometryError::EmptyBoard { rows, cols });
        }
        let longest = rows.max(cols);
        if longest > Self::MAX_SIDE {
            return Err(GeometryError::TooLarge {
                requested: longest,
                max: Self::MAX_SIDE,
            });
        }

        let size = CellSize::fit(self.canvas_budget, rows, cols);
        self.stylesheet = Stylesheet::uniform(size);
        self.rows = rows;
        self.cols = cols;
        self.pieces = Grid::new(rows, cols);
        self.overlay = Grid::new(rows, cols);
        self.generation += 1;

        tracing::debug!(
            rows,
            cols,
            %size,
            generation = self.generation,
            "board rebuilt"
        );

        Ok(self.layout())
    }

    /// The current layout. Meaningless until the first `configure`.
    pub fn layout(&self) -> Layout {
        Layout {
            rows: self.rows,
            cols: self.cols,
            generation: self.generation,
            stylesheet: self.stylesheet,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    pub fn is_configured(&self) -> bool {
        self.generation > 0
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    /// Checks `at` against the current dimensions.
    pub fn check(&self, at: Coord) -> Result<(), GeometryError> {
        self.layout().check(at)
    }

    /// Issues a reference to the cell at `at` in the current build.
    pub fn cell_ref(
        &self,
        layer: Layer,
        at: Coord,
    ) -> Result<CellRef, GeometryError> {
        self.check(at)?;
        Ok(CellRef {
            layer,
            at,
            generation: self.generation,
        })
    }

    /// Reads the cell behind `cell`.
    pub fn get(&self, cell: CellRef) -> Result<&CellContent, GeometryError> {
        self.validate(cell)?;
        let grid = self.grid(cell.layer);
        Ok(&grid.cells[grid.index(cell.at)])
    }

    /// Replaces the cell behind `cell`, returning what it held before.
    pub fn set(
        &mut self,
        cell: CellRef,
        content: CellContent,
    ) -> Result<CellContent, GeometryError> {
        self.validate(cell)?;
        let grid = self.grid_mut(cell.layer);
        let index = grid.index(cell.at);
        Ok(std::mem::replace(&mut grid.cells[index], content))
    }

    /// Replaces the cell at `at` in the current build.
    pub fn paint(
        &mut self,
        layer: Layer,
        at: Coord,
        content: CellContent,
    ) -> Result<CellRef, GeometryError> {
        let cell = self.cell_ref(layer, at)?;
        self.set(cell, content)?;
        Ok(cell)
    }

    /// Reads the cell at `at`, if it is on the board.
    pub fn cell(&self, layer: Layer, at: Coord) -> Option<&CellContent> {
        let cell = self.cell_ref(layer, at).ok()?;
        self.get(cell).ok()
    }

    fn validate(&self, cell: CellRef) -> Result<(), GeometryError> {
        if cell.generation != self.generation {
            return Err(GeometryError::Stale {
                held: cell.generation,
                current: self.generation,
            });
        }
        // Same generation implies same dimensions, but keep the bounds
        // check so indexing can't go wrong.
        self.check(cell.at)
    }

    fn grid(&self, layer: Layer) -> &Grid {
        match layer {
            Layer::Pieces => &self.pieces,
            Layer::Overlay => &self.overlay,
        }
    }

    fn grid_mut(&mut self, layer: Layer) -> &mut Grid {
        match layer {
            Layer::Pieces => &mut self.pieces,
            Layer::Overlay => &mut self.overlay,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_BUDGET)
    }
}
