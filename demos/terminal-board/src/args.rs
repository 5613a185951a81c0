use std::path::PathBuf;

use boardcast::config::{
    ClientConfig, DEFAULT_ASSET_NAMESPACE, DEFAULT_CANVAS_BUDGET, DEFAULT_ENDPOINT,
};
use boardcast::session::LaunchContext;
use clap::Parser;

/// Connects to a game server and plays in the terminal.
///
/// Type `click <row> <col>` to click a cell. When the server asks a
/// question, the next line you type is the answer; `!cancel` dismisses it.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// WebSocket URL of the game server.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Launch parameters as a query string, e.g. `?room=7&mode=chess`.
    #[arg(short, long)]
    pub query: Option<String>,

    /// Room to join. Overrides `--query`.
    #[arg(long)]
    pub room: Option<String>,

    /// Game mode. Overrides `--query`.
    #[arg(long)]
    pub mode: Option<String>,

    /// User name. Overrides `--query`.
    #[arg(long)]
    pub user: Option<String>,

    /// HTTP base URL piece images are fetched from. Defaults to the host
    /// behind `--endpoint`.
    #[arg(long, conflicts_with = "assets")]
    pub asset_url: Option<String>,

    /// Read piece images from this directory instead of over HTTP.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Path under the asset root holding the images.
    #[arg(long, default_value = DEFAULT_ASSET_NAMESPACE)]
    pub namespace: String,

    /// Viewport units the board may take along its longer side.
    #[arg(long, default_value_t = DEFAULT_CANVAS_BUDGET)]
    pub budget: u32,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            asset_namespace: self.namespace.clone(),
            canvas_budget: self.budget,
            asset_url: self.asset_url.clone(),
        }
    }

    pub fn launch(&self) -> LaunchContext {
        let mut launch = self
            .query
            .as_deref()
            .map(LaunchContext::from_query)
            .unwrap_or_default();
        if let Some(room) = &self.room {
            launch.room = Some(room.clone());
        }
        if let Some(mode) = &self.mode {
            launch.mode = Some(mode.clone());
        }
        if let Some(user) = &self.user {
            launch.user = Some(user.clone());
        }
        launch
    }
}
