//! `BoardClient` builder and entry point.
//!
//! Ties the layers together: WebSocket transport → effect decoder →
//! ordered queue → executor → board and surface.

use boardcast_board::{Board, Surface};
use boardcast_queue::QueueStats;
use boardcast_transport::{ConnectionState, WebSocketConnection};

use crate::assets::{AssetStore, FetchError, HttpAssetStore};
use crate::config::ClientConfig;
use crate::executor::EffectExecutor;
use crate::prompt::Prompter;
use crate::reporter::InteractionReporter;
use crate::session::{LaunchContext, Session};
use crate::BoardcastError;

/// Builder for configuring and connecting a [`BoardClient`].
///
/// # Example
///
/// ```rust,no_run
/// use boardcast::prelude::*;
///
/// # async fn demo() -> Result<(), BoardcastError> {
/// let builder = BoardClient::builder()
///     .endpoint("ws://127.0.0.1:19684")
///     .launch(LaunchContext::from_query("?room=lobby&mode=chess"));
/// let assets = builder.http_assets()?;
/// let client = builder
///     .connect(MemorySurface::new(), assets, DismissPrompts)
///     .await?;
/// client.run().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct BoardClientBuilder {
    config: ClientConfig,
    launch: LaunchContext,
}

impl BoardClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every setting at once.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the WebSocket URL of the game server.
    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.config.endpoint = endpoint.to_string();
        self
    }

    /// Sets the room, mode and user sent in the handshake.
    pub fn launch(mut self, launch: LaunchContext) -> Self {
        self.launch = launch;
        self
    }

    /// Sets the prefix image glyphs are fetched under.
    pub fn asset_namespace(mut self, namespace: &str) -> Self {
        self.config.asset_namespace = namespace.to_string();
        self
    }

    /// Sets how many viewport units the board may take.
    pub fn canvas_budget(mut self, budget: u32) -> Self {
        self.config.canvas_budget = budget;
        self
    }

    /// Sets the HTTP base URL piece images are fetched from, instead of
    /// the endpoint's host.
    pub fn asset_url(mut self, url: &str) -> Self {
        self.config.asset_url = Some(url.to_string());
        self
    }

    /// The HTTP store for this configuration: `asset_url` if set,
    /// otherwise the host behind `endpoint`.
    ///
    /// # Errors
    /// [`FetchError::InvalidUrl`] if the chosen URL can't be used.
    pub fn http_assets(&self) -> Result<HttpAssetStore, FetchError> {
        match &self.config.asset_url {
            Some(url) => HttpAssetStore::new(url),
            None => HttpAssetStore::for_endpoint(&self.config.endpoint),
        }
    }

    /// Connects to the server, sends the handshake and starts applying
    /// effects to `surface`.
    pub async fn connect<S, A, P>(
        self,
        surface: S,
        assets: A,
        prompter: P,
    ) -> Result<BoardClient, BoardcastError>
    where
        S: Surface,
        A: AssetStore,
        P: Prompter,
    {
        let conn = WebSocketConnection::connect(&self.config.endpoint).await?;
        tracing::info!(endpoint = %self.config.endpoint, "connected");

        let board = Board::new(self.config.canvas_budget);
        let namespace = self.config.asset_namespace;
        let session = Session::start(conn, self.launch.handshake(), move |reporter| {
            EffectExecutor::new(board, surface, assets, prompter, reporter).asset_namespace(namespace)
        });

        Ok(BoardClient { session })
    }
}

/// A client connected to a game server.
///
/// Call [`run()`](Self::run) to wait for the game to end.
pub struct BoardClient {
    session: Session<WebSocketConnection>,
}

impl BoardClient {
    /// Creates a new builder.
    pub fn builder() -> BoardClientBuilder {
        BoardClientBuilder::new()
    }

    /// A handle for reporting clicks on the board.
    pub fn reporter(&self) -> InteractionReporter {
        self.session.reporter()
    }

    pub fn state(&self) -> ConnectionState {
        self.session.state()
    }

    /// Closes the connection from this side. Effects already received are
    /// still applied before [`run`](Self::run) returns.
    pub async fn shutdown(&self) -> Result<(), BoardcastError> {
        Ok(self.session.shutdown().await?)
    }

    /// Runs until the connection closes and every effect has been applied.
    pub async fn run(self) -> Result<QueueStats, BoardcastError> {
        let stats = self.session.wait().await?;
        tracing::info!(
            completed = stats.completed,
            failed = stats.failed,
            "client stopped"
        );
        Ok(stats)
    }
}
