//! Piece imagery.
//!
//! A `draw_piece` glyph that names an image (`"pawn.svg"`) is fetched from
//! an [`AssetStore`] under a fixed namespace before it is painted. The
//! fetch is the only slow step in applying an effect, and it happens
//! inside the ordered queue, so a slow image still lands before anything
//! the server sent after it.
//!
//! The game host serves its images over HTTP next to the WebSocket
//! endpoint, which is what [`HttpAssetStore`] talks to. [`DirAssetStore`]
//! and [`MemoryAssetStore`] serve local copies.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use reqwest::{StatusCode, Url};

/// File suffixes that mark a glyph as an image rather than literal text.
pub const IMAGE_SUFFIXES: [&str; 6] = ["svg", "png", "gif", "jpg", "jpeg", "webp"];

/// Why an asset could not be loaded. The cell keeps its old content.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The glyph tried to escape the namespace (`..`, a separator) or was
    /// empty.
    #[error("invalid asset name {0:?}")]
    InvalidName(String),

    #[error("asset {0:?} not found")]
    NotFound(String),

    #[error("failed to read asset {path:?}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The asset host's address could not be turned into an HTTP URL.
    #[error("invalid asset url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The asset host answered with something other than success.
    #[error("asset request to {url} failed with HTTP {status}")]
    Status { url: String, status: u16 },

    /// The asset host could not be reached, or the body was unreadable.
    #[error("asset request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Returns `true` if `glyph` names an image asset.
pub fn is_image_asset(glyph: &str) -> bool {
    match glyph.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => IMAGE_SUFFIXES
            .iter()
            .any(|suffix| ext.eq_ignore_ascii_case(suffix)),
        _ => false,
    }
}

/// Joins `namespace` and a bare asset `name` into the path handed to the
/// store.
///
/// # Errors
/// [`FetchError::InvalidName`] if `name` is empty, contains a path
/// separator, or contains `..`.
pub fn asset_path(namespace: &str, name: &str) -> Result<String, FetchError> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(FetchError::InvalidName(name.to_string()));
    }
    let namespace = namespace.trim_end_matches('/');
    if namespace.is_empty() {
        Ok(name.to_string())
    } else {
        Ok(format!("{namespace}/{name}"))
    }
}

/// Somewhere piece images can be loaded from.
///
/// `path` is namespace-qualified, e.g. `chess/images/pawn.svg`. The
/// returned string is the image markup painted into the cell.
pub trait AssetStore: Send + Sync + 'static {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

// ---------------------------------------------------------------------------
// DirAssetStore
// ---------------------------------------------------------------------------

/// Serves assets from files under a root directory.
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps `path` under the root, refusing anything that could leave it.
    fn resolve(&self, path: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(path);
        let inside = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !inside {
            return Err(FetchError::InvalidName(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetStore for DirAssetStore {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let file = self.resolve(path)?;
        tracing::debug!(path, file = %file.display(), "reading asset");
        tokio::fs::read_to_string(&file).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                FetchError::NotFound(path.to_string())
            } else {
                FetchError::Io {
                    path: path.to_string(),
                    source: e,
                }
            }
        })
    }
}

// ---------------------------------------------------------------------------
// HttpAssetStore
// ---------------------------------------------------------------------------

/// Fetches assets over HTTP, relative to a base URL.
///
/// A fetch has no deadline of its own: a request that never completes
/// holds the effect queue until the connection gives up.
#[derive(Debug, Clone)]
pub struct HttpAssetStore {
    client: reqwest::Client,
    base: Url,
}

impl HttpAssetStore {
    /// Serves assets under `base`, e.g. `http://127.0.0.1:19684/static/`.
    ///
    /// # Errors
    /// [`FetchError::InvalidUrl`] unless `base` is an `http` or `https` URL.
    pub fn new(base: &str) -> Result<Self, FetchError> {
        let mut url = parse_url(base)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid_url(base, "expected an http or https url"));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);
        Self::with_base(url)
    }

    /// Serves assets from the root of the host behind a game endpoint:
    /// `ws://host:port/...` becomes `http://host:port/`, `wss` becomes
    /// `https`.
    ///
    /// # Errors
    /// [`FetchError::InvalidUrl`] if `endpoint` is not a WebSocket or HTTP
    /// URL.
    pub fn for_endpoint(endpoint: &str) -> Result<Self, FetchError> {
        let mut url = parse_url(endpoint)?;
        let scheme = match url.scheme() {
            "ws" | "http" => "http",
            "wss" | "https" => "https",
            _ => return Err(invalid_url(endpoint, "expected a ws or wss url")),
        };
        url.set_scheme(scheme)
            .map_err(|()| invalid_url(endpoint, "cannot switch to http"))?;
        url.set_path("/");
        url.set_query(None);
        url.set_fragment(None);
        Self::with_base(url)
    }

    fn with_base(base: Url) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|source| FetchError::Request {
                url: base.to_string(),
                source,
            })?;
        Ok(Self { client, base })
    }

    /// The URL every asset path is resolved against.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Appends `path`'s segments to the base. Each segment is
    /// percent-encoded, so nothing in `path` can change the host.
    fn url_for(&self, path: &str) -> Result<Url, FetchError> {
        if path.is_empty() {
            return Err(FetchError::InvalidName(path.to_string()));
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidName(path.to_string()))?
            .pop_if_empty()
            .extend(path.split('/'));
        Ok(url)
    }
}

impl AssetStore for HttpAssetStore {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url_for(path)?;
        tracing::debug!(path, %url, "requesting asset");

        let request_failed = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(request_failed)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(FetchError::NotFound(path.to_string())),
            status if status.is_success() => response.text().await.map_err(request_failed),
            status => Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}

fn parse_url(url: &str) -> Result<Url, FetchError> {
    Url::parse(url).map_err(|e| invalid_url(url, e))
}

fn invalid_url(url: &str, reason: impl ToString) -> FetchError {
    FetchError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// MemoryAssetStore
// ---------------------------------------------------------------------------

/// Serves assets from a map held in memory. Clones share the map.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    assets: Arc<HashMap<String, String>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the asset at `path`.
    pub fn with(mut self, path: impl Into<String>, markup: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.assets).insert(path.into(), markup.into());
        self
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetStore for MemoryAssetStore {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.assets
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_suffixes() {
        assert!(is_image_asset("pawn.svg"));
        assert!(is_image_asset("king.PNG"));
        assert!(is_image_asset("a.b.webp"));
        assert!(!is_image_asset("K"));
        assert!(!is_image_asset(""));
        assert!(!is_image_asset(".svg"));
        assert!(!is_image_asset("notes.txt"));
        assert!(!is_image_asset("svg"));
    }

    #[test]
    fn test_asset_path_joins_namespace() {
        assert_eq!(
            asset_path("chess/images/", "pawn.svg").unwrap(),
            "chess/images/pawn.svg"
        );
        assert_eq!(
            asset_path("chess/images", "pawn.svg").unwrap(),
            "chess/images/pawn.svg"
        );
        assert_eq!(asset_path("", "pawn.svg").unwrap(), "pawn.svg");
    }

    #[test]
    fn test_asset_path_rejects_escapes() {
        for bad in ["", "../secret.svg", "a/b.svg", "a\\b.svg", "..svg"] {
            assert!(
                matches!(asset_path("chess/images/", bad), Err(FetchError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_dir_store_refuses_to_leave_root() {
        let store = DirAssetStore::new("/srv/assets");
        assert!(store.resolve("chess/images/pawn.svg").is_ok());
        assert!(store.resolve("../etc/passwd").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
        assert!(store.resolve("chess/./pawn.svg").is_ok());
        assert!(store.resolve("").is_err());
    }

    #[tokio::test]
    async fn test_dir_store_reads_files() {
        let root = std::env::temp_dir().join(format!("boardcast-assets-{}", std::process::id()));
        tokio::fs::create_dir_all(root.join("chess/images")).await.unwrap();
        tokio::fs::write(root.join("chess/images/pawn.svg"), "<svg/>")
            .await
            .unwrap();

        let store = DirAssetStore::new(&root);
        assert_eq!(store.fetch("chess/images/pawn.svg").await.unwrap(), "<svg/>");
        assert!(matches!(
            store.fetch("chess/images/queen.svg").await,
            Err(FetchError::NotFound(_))
        ));

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[test]
    fn test_http_store_follows_the_game_endpoint() {
        let store = HttpAssetStore::for_endpoint("ws://127.0.0.1:19684/socket?room=1").unwrap();
        assert_eq!(store.base().as_str(), "http://127.0.0.1:19684/");

        let store = HttpAssetStore::for_endpoint("wss://game.example/play").unwrap();
        assert_eq!(store.base().as_str(), "https://game.example/");

        for bad in ["ftp://game.example/", "not a url"] {
            assert!(matches!(
                HttpAssetStore::for_endpoint(bad),
                Err(FetchError::InvalidUrl { .. })
            ));
        }
    }

    #[test]
    fn test_http_store_base_gets_trailing_slash() {
        let store = HttpAssetStore::new("http://cdn.example/static").unwrap();
        assert_eq!(store.base().as_str(), "http://cdn.example/static/");
        assert!(matches!(
            HttpAssetStore::new("ws://cdn.example/"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_http_store_urls_stay_on_the_host() {
        let store = HttpAssetStore::new("http://cdn.example/static/").unwrap();
        assert_eq!(
            store.url_for("chess/images/pawn.svg").unwrap().as_str(),
            "http://cdn.example/static/chess/images/pawn.svg"
        );
        assert_eq!(
            store.url_for("evil:x.svg").unwrap().host_str(),
            Some("cdn.example")
        );
        assert_eq!(
            store.url_for("a b#c.svg").unwrap().as_str(),
            "http://cdn.example/static/a%20b%23c.svg"
        );
        assert!(store.url_for("").is_err());
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryAssetStore::new().with("chess/images/pawn.svg", "<svg/>");
        assert_eq!(store.len(), 1);
        assert_eq!(store.fetch("chess/images/pawn.svg").await.unwrap(), "<svg/>");
        assert!(matches!(
            store.fetch("pawn.svg").await,
            Err(FetchError::NotFound(p)) if p == "pawn.svg"
        ));
    }
}
