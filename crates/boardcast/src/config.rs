//! Client settings.

use serde::{Deserialize, Serialize};

pub use boardcast_board::DEFAULT_CANVAS_BUDGET;

/// Where the game server listens unless told otherwise.
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:19684";

/// Directory the server's piece images live under.
pub const DEFAULT_ASSET_NAMESPACE: &str = "chess/images/";

/// Configuration for a [`BoardClient`](crate::BoardClient).
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// WebSocket URL of the game server.
    pub endpoint: String,
    /// Prefix joined to image glyphs before they are fetched.
    pub asset_namespace: String,
    /// Viewport units the whole board may take along its longer side.
    pub canvas_budget: u32,
    /// HTTP base URL piece images are fetched from. When unset they come
    /// from the host serving `endpoint`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            asset_namespace: DEFAULT_ASSET_NAMESPACE.to_string(),
            canvas_budget: DEFAULT_CANVAS_BUDGET,
            asset_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "ws://127.0.0.1:19684");
        assert_eq!(config.asset_namespace, "chess/images/");
        assert_eq!(config.canvas_budget, 80);
        assert_eq!(config.asset_url, None);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"endpoint":"ws://game.example:9000"}"#).unwrap();
        assert_eq!(config.endpoint, "ws://game.example:9000");
        assert_eq!(config.canvas_budget, DEFAULT_CANVAS_BUDGET);
        assert_eq!(config.asset_url, None);

        let config: ClientConfig =
            serde_json::from_str(r#"{"asset_url":"http://cdn.example/"}"#).unwrap();
        assert_eq!(config.asset_url.as_deref(), Some("http://cdn.example/"));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }
}
