//! Applying effects to the board and the surface.
//!
//! The [`EffectExecutor`] is the queue's [`Handler`]: the worker hands it
//! one [`QueuedTask`] at a time and waits for it to finish. It owns the
//! [`Board`] outright, so nothing else can touch the grid while an effect
//! is half applied, and it mirrors every committed change onto the
//! [`Surface`].

use boardcast_board::{Board, CellContent, Layer, Surface};
use boardcast_protocol::{Coord, Effect, Setting};
use boardcast_queue::Handler;

use crate::assets::{AssetStore, asset_path, is_image_asset};
use crate::config::DEFAULT_ASSET_NAMESPACE;
use crate::error::ExecError;
use crate::prompt::Prompter;
use crate::reporter::InteractionReporter;

/// Status text shown once the server has gone away.
pub const CONNECTION_CLOSED: &str = "connection closed";

/// One unit of work on the effect queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueuedTask {
    /// An effect decoded from the server.
    Apply(Effect),
    /// The connection ended. Queued behind every effect that arrived
    /// before it, so the notice is the last thing shown.
    Closed { reason: String },
}

/// Runs effects against the board, in whatever order the queue hands
/// them over.
pub struct EffectExecutor<S, A, P> {
    board: Board,
    surface: S,
    assets: A,
    prompter: P,
    reporter: InteractionReporter,
    namespace: String,
}

impl<S, A, P> EffectExecutor<S, A, P>
where
    S: Surface,
    A: AssetStore,
    P: Prompter,
{
    pub fn new(
        board: Board,
        surface: S,
        assets: A,
        prompter: P,
        reporter: InteractionReporter,
    ) -> Self {
        Self {
            board,
            surface,
            assets,
            prompter,
            reporter,
            namespace: DEFAULT_ASSET_NAMESPACE.to_string(),
        }
    }

    /// Sets the prefix image glyphs are fetched under.
    pub fn asset_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Applies one effect.
    ///
    /// # Errors
    /// Returns the reason the effect was dropped. The board and the
    /// surface are left as they were.
    pub async fn apply(&mut self, effect: Effect) -> Result<(), ExecError> {
        match effect {
            Effect::DrawPiece { at, glyph, colour } => self.draw_piece(at, glyph, colour).await,
            Effect::Configure(Setting::BoardSize { rows, cols }) => {
                let layout = self.board.configure(rows, cols)?;
                self.surface.rebuild(&layout);
                self.reporter.publish_layout(&layout);
                tracing::info!(rows, cols, cell = %layout.cell_size(), "board configured");
                Ok(())
            }
            Effect::SetStatus(markup) => {
                self.surface.set_status(&markup);
                Ok(())
            }
            Effect::SetOverlay { at, text, colour } => {
                let content = CellContent::text(text, colour);
                self.board.paint(Layer::Overlay, at, content.clone())?;
                self.surface.paint(Layer::Overlay, at, &content);
                Ok(())
            }
            Effect::AskString(prompt) => {
                let answer = self.prompter.ask(&prompt).await;
                self.reporter.write(answer)?;
                Ok(())
            }
        }
    }

    /// Text glyphs paint straight away; image glyphs are fetched first.
    ///
    /// The target cell is pinned before the fetch. Nothing else can run
    /// on the board while the fetch is pending, so the reference is still
    /// current when the image arrives.
    async fn draw_piece(
        &mut self,
        at: Coord,
        glyph: String,
        colour: String,
    ) -> Result<(), ExecError> {
        let cell = self.board.cell_ref(Layer::Pieces, at)?;

        let content = if is_image_asset(&glyph) {
            let path = asset_path(&self.namespace, &glyph)?;
            let markup = self.assets.fetch(&path).await?;
            tracing::debug!(row = at.row, col = at.col, %path, "asset fetched");
            CellContent::Image {
                markup,
                fill: colour,
            }
        } else {
            CellContent::text(glyph, colour)
        };

        self.board.set(cell, content.clone())?;
        self.surface.paint(Layer::Pieces, at, &content);
        Ok(())
    }
}

impl<S, A, P> Handler<QueuedTask> for EffectExecutor<S, A, P>
where
    S: Surface,
    A: AssetStore,
    P: Prompter,
{
    type Error = ExecError;

    async fn handle(&mut self, seq: u64, task: QueuedTask) -> Result<(), ExecError> {
        match task {
            QueuedTask::Apply(effect) => {
                tracing::debug!(seq, effect = effect.name(), "applying effect");
                self.apply(effect).await
            }
            QueuedTask::Closed { reason } => {
                tracing::info!(seq, %reason, "showing connection closed notice");
                self.surface.set_status(CONNECTION_CLOSED);
                Ok(())
            }
        }
    }
}
