//! # Boardcast
//!
//! Thin client for server-driven board games.
//!
//! The server streams *effects* (draw a piece, resize the board, set the
//! status line, mark a cell, ask a question) and the client applies them
//! to a [`Surface`](boardcast_board::Surface) strictly in the order they
//! arrived, even when one of them has to fetch an image first. Clicks and
//! prompt answers go back over the same connection.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use boardcast::prelude::*;
//!
//! # async fn demo() -> Result<(), BoardcastError> {
//! let surface = MemorySurface::new();
//! let builder = BoardClient::builder().launch(LaunchContext::new().room("lobby").mode("chess"));
//! let assets = builder.http_assets()?;
//! let client = builder.connect(surface.clone(), assets, DismissPrompts).await?;
//!
//! // Clicks are accepted once the server has configured the board.
//! let reporter = client.reporter();
//! if reporter.watch_layout().wait_for(|layout| layout.generation > 0).await.is_ok() {
//!     reporter.click(Coord::new(6, 4))?;
//! }
//! client.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod assets;
mod client;
pub mod config;
mod error;
pub mod executor;
pub mod prompt;
pub mod reporter;
pub mod session;

pub use client::{BoardClient, BoardClientBuilder};
pub use error::{BoardcastError, ExecError};

/// Convenience re-exports for client code.
pub mod prelude {
    pub use crate::assets::{
        AssetStore, DirAssetStore, FetchError, HttpAssetStore, MemoryAssetStore,
    };
    pub use crate::config::ClientConfig;
    pub use crate::executor::{EffectExecutor, QueuedTask};
    pub use crate::prompt::{ChannelPrompter, DismissPrompts, PromptRequest, Prompter};
    pub use crate::reporter::InteractionReporter;
    pub use crate::session::{LaunchContext, Session};
    pub use crate::{BoardClient, BoardClientBuilder, BoardcastError, ExecError};

    pub use boardcast_board::{
        Board, CellContent, Frame, GeometryError, Layer, Layout, MemorySurface, Surface,
        SurfaceEvent, Tile,
    };
    pub use boardcast_protocol::{Coord, Effect, Outbound, ProtocolError, Setting};
    pub use boardcast_queue::QueueStats;
    pub use boardcast_transport::{ConnectionState, TransportError};
}
