//! Drawing the board as text.

use std::io::{self, Write};

use boardcast::prelude::*;

/// Clears the screen and moves the cursor home.
const CLEAR: &str = "\x1b[2J\x1b[H";

/// A [`Surface`] that redraws the whole board into a writer after every
/// change.
pub struct TerminalSurface<W> {
    frame: Frame,
    out: W,
    clear: bool,
}

impl TerminalSurface<io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            frame: Frame::default(),
            out: io::stdout(),
            clear: true,
        }
    }
}

impl<W: Write + Send + 'static> TerminalSurface<W> {
    fn redraw(&mut self) {
        let text = render(&self.frame);
        let clear = if self.clear { CLEAR } else { "" };
        if let Err(e) = write!(self.out, "{clear}{text}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "failed to draw board");
        }
    }
}

impl<W: Write + Send + 'static> Surface for TerminalSurface<W> {
    fn rebuild(&mut self, layout: &Layout) {
        self.frame.rebuild(layout);
        self.redraw();
    }

    fn paint(&mut self, layer: Layer, at: Coord, content: &CellContent) {
        self.frame.paint(layer, at, content);
        self.redraw();
    }

    fn set_status(&mut self, markup: &str) {
        self.frame.set_status(markup);
        self.redraw();
    }
}

/// Renders `frame` as a grid with row and column numbers, followed by
/// the status line.
///
/// A piece hides the overlay beneath it; an empty cell shows its tile.
pub fn render(frame: &Frame) -> String {
    let mut out = String::new();

    if let Some(layout) = &frame.layout {
        out.push_str("   ");
        for col in 0..layout.cols {
            out.push_str(&format!("{col:^3}"));
        }
        out.push('\n');

        for row in 0..layout.rows {
            out.push_str(&format!("{row:>2} "));
            for col in 0..layout.cols {
                let at = Coord::new(row, col);
                let symbol = cell_symbol(frame.piece(at))
                    .or_else(|| cell_symbol(frame.overlay(at)))
                    .unwrap_or_else(|| tile_symbol(layout.tile(at)).to_string());
                out.push_str(&format!("{symbol:^3}"));
            }
            out.push('\n');
        }
    }

    out.push_str(&strip_markup(&frame.status));
    out.push('\n');
    out
}

fn cell_symbol(content: Option<&CellContent>) -> Option<String> {
    match content? {
        CellContent::Empty => None,
        CellContent::Text { text, .. } => Some(text.chars().take(3).collect()),
        CellContent::Image { fill, .. } => Some(image_symbol(fill).to_string()),
    }
}

/// Images can't be shown, so they become a filled or hollow disc
/// depending on how light their fill colour is.
fn image_symbol(fill: &str) -> char {
    let light = match fill.trim().to_ascii_lowercase().as_str() {
        "white" | "#fff" | "#ffffff" => true,
        "black" | "#000" | "#000000" => false,
        other => other.starts_with('w'),
    };
    if light { 'o' } else { '@' }
}

fn tile_symbol(tile: Tile) -> &'static str {
    match tile {
        Tile::Light => " ",
        Tile::Dark => ".",
    }
}

/// Drops anything between `<` and `>`.
fn strip_markup(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(rows: usize, cols: usize) -> Frame {
        let mut board = Board::default();
        let mut frame = Frame::default();
        frame.rebuild(&board.configure(rows, cols).unwrap());
        frame
    }

    #[test]
    fn test_empty_board_shows_tiles() {
        let frame = configured(2, 2);
        assert_eq!(render(&frame), "    0  1 \n 0  .    \n 1     . \n\n");
    }

    #[test]
    fn test_piece_hides_overlay() {
        let mut frame = configured(1, 2);
        frame.paint(Layer::Overlay, Coord::new(0, 0), &CellContent::text("x", "g"));
        frame.paint(Layer::Pieces, Coord::new(0, 0), &CellContent::text("K", "w"));
        frame.paint(Layer::Overlay, Coord::new(0, 1), &CellContent::text("x", "g"));

        let text = render(&frame);
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, " 0  K  x ");
    }

    #[test]
    fn test_images_render_by_fill() {
        let mut frame = configured(1, 2);
        let image = |fill: &str| CellContent::Image {
            markup: "<svg/>".into(),
            fill: fill.into(),
        };
        frame.paint(Layer::Pieces, Coord::new(0, 0), &image("white"));
        frame.paint(Layer::Pieces, Coord::new(0, 1), &image("black"));

        let text = render(&frame);
        assert_eq!(text.lines().nth(1).unwrap(), " 0  o  @ ");
    }

    #[test]
    fn test_status_markup_is_stripped() {
        let mut frame = Frame::default();
        frame.set_status("<b>white</b> to move");
        assert_eq!(render(&frame), "white to move\n");
    }

    #[test]
    fn test_surface_writes_every_change() {
        let mut surface = TerminalSurface {
            frame: Frame::default(),
            out: Vec::new(),
            clear: false,
        };
        surface.set_status("one");
        surface.set_status("two");
        assert_eq!(String::from_utf8(surface.out).unwrap(), "one\ntwo\n");
    }
}
