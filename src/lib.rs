//! Fesnuk: client core for a topic-community forum.
//!
//! Fesnuk is the non-visual half of a forum client. It provides:
//! - Typed wire records and an async REST client for the forum API
//! - Repositories translating wire records into domain types
//! - Optimistic emoji reactions with rollback, backed by a local reaction store
//! - A two-level comment tree with lazily loaded replies
//! - One controller per screen, publishing immutable UI state snapshots

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! The crate follows a layered architecture pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Presentation (not part of this crate)              │  ← Renders snapshots
//! └─────────────────────────────────────────────────────┘
//!                        │ intents ▲ snapshots
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← Screen controllers
//! │  - Reaction reconciliation                          │
//! │  - Comment tree                                     │
//! │  - Snapshot cells                                   │
//! └─────────────────────────────────────────────────────┘
//!         │                                       │
//! ┌───────────────────────┐   ┌─────────────────────────┐
//! │ Repositories          │   │ Storage Layer           │
//! │ (repository/)         │   │ (storage/)              │
//! │ - Record → domain     │   │ - Reaction membership   │
//! │ - Upload naming       │   │ - JSON file / in-memory │
//! └───────────────────────┘   └─────────────────────────┘
//!         │
//! ┌─────────────────────────────────────────────────────┐
//! │  API Layer (api/)                                   │  ← reqwest + serde
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain, Infrastructure & Observability             │
//! │  - Records, ids, errors, time labels (domain/)      │
//! │  - Data directory (infrastructure/)                 │
//! │  - JSON log file (observability/)                   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Screen controllers, reactions and comment tree
//! - [`api`]: Forum API trait and HTTP client
//! - [`domain`]: Core domain types (Nook, Post, Comment, errors)
//! - [`infrastructure`]: Platform paths
//! - [`repository`]: Wire-to-domain repositories
//! - [`storage`]: Local reaction store
//! - [`observability`]: Tracing subscriber and rotating log file
//!
//! # Configuration
//!
//! Configuration comes from a TOML file or a string map:
//!
//! ```toml
//! api_base_url = "https://forum.example.com/api/"
//! attachment_base_url = "https://blobs.example.com/attachments/"
//! upload_url_template = "https://blobs.example.com/attachments/{name}?sig=..."
//! data_dir = "~/.local/share/fesnuk"
//! request_timeout_secs = 30
//! trace_level = "debug"
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use fesnuk::{initialize, Config};
//!
//! # async fn run() -> fesnuk::Result<()> {
//! let config = Config::from_file("fesnuk.toml")?;
//! let app = initialize(&config)?;
//!
//! let mut thread = app.thread();
//! thread.load_post(42).await;
//! if let Some(root) = thread.state().comments.roots().first() {
//!     thread.toggle_comment_expansion(root.id).await;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Key Design Decisions
//!
//! ## Optimistic Reactions
//!
//! A reaction toggle is visible before the server answers. The previous
//! values travel with the in-flight toggle, so a failure restores exactly what
//! was shown before. A second toggle on the same emoji is refused until the
//! first one settles.
//!
//! ## Lazy Replies
//!
//! Root comments load with the post. Replies load the first time a root is
//! expanded and are cached for the rest of the screen's life.
//!
//! ## Wholesale Snapshots
//!
//! Controllers never mutate published state in place. Each transition
//! publishes a new snapshot through a `tokio::sync::watch` channel.

pub mod api;
pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod repository;
pub mod storage;

pub use app::App;
pub use domain::{FesnukError, Result};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default API location.
const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/";

/// Public blob container serving attachments.
const DEFAULT_ATTACHMENT_BASE_URL: &str = "https://fesnukberust.blob.core.windows.net/storage/attachments/";

/// Upload target. Deployments append their own signature query.
const DEFAULT_UPLOAD_URL_TEMPLATE: &str = "https://fesnukberust.blob.core.windows.net/storage/attachments/{name}";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// File name of the reaction store inside the data directory.
const REACTIONS_FILE: &str = "reactions.json";

/// Client configuration.
///
/// Every field has a default, so a configuration file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the forum REST API. A trailing slash is added if missing.
    pub api_base_url: String,

    /// Base URL attachment blob names are appended to for display.
    pub attachment_base_url: String,

    /// Pre-signed upload URL with a `{name}` placeholder for the blob name.
    pub upload_url_template: String,

    /// Directory for the reaction store and the log file.
    ///
    /// A leading `~` is expanded. Default: see
    /// [`infrastructure::get_data_dir`].
    pub data_dir: PathBuf,

    /// Per-request timeout in seconds. Default: 30
    pub request_timeout_secs: u64,

    /// Tracing level.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`. Default: `"info"`
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            attachment_base_url: DEFAULT_ATTACHMENT_BASE_URL.to_string(),
            upload_url_template: DEFAULT_UPLOAD_URL_TEMPLATE.to_string(),
            data_dir: infrastructure::get_data_dir(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            trace_level: None,
        }
    }
}

impl Config {
    /// Parses configuration from a string map, such as environment-derived
    /// settings.
    ///
    /// # Parsing Rules
    ///
    /// - Missing keys keep their defaults
    /// - `request_timeout_secs`: falls back to 30 on parse error or zero
    /// - `data_dir`: leading `~` is expanded
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use fesnuk::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("api_base_url".to_string(), "https://forum.example.com/".to_string());
    /// map.insert("request_timeout_secs".to_string(), "5".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.api_base_url, "https://forum.example.com/");
    /// assert_eq!(config.request_timeout_secs, 5);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str, fallback: String| {
            map.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };

        let request_timeout_secs = map
            .get("request_timeout_secs")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let data_dir = map
            .get("data_dir")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map_or(defaults.data_dir, infrastructure::expand_tilde);

        Self {
            api_base_url: text("api_base_url", defaults.api_base_url),
            attachment_base_url: text("attachment_base_url", defaults.attachment_base_url),
            upload_url_template: text("upload_url_template", defaults.upload_url_template),
            data_dir,
            request_timeout_secs,
            trace_level: map.get("trace_level").cloned(),
        }
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`FesnukError::Io`] if the file cannot be read and
    /// [`FesnukError::Config`] if it is not valid TOML for this structure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)
            .map_err(|e| FesnukError::Config(format!("{}: {e}", path.display())))?;

        if let Some(raw) = config.data_dir.to_str() {
            config.data_dir = infrastructure::expand_tilde(raw);
        }
        if config.request_timeout_secs == 0 {
            config.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }

        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Location of the JSON reaction store.
    #[must_use]
    pub fn reactions_path(&self) -> PathBuf {
        self.data_dir.join(REACTIONS_FILE)
    }
}

/// Builds an [`App`] wired to the HTTP API and the JSON reaction store.
///
/// # Side Effects
///
/// - Installs the tracing subscriber (first call only)
/// - Creates the data directory if it doesn't exist
///
/// # Errors
///
/// Returns an error if the API base URL is invalid or the data directory
/// cannot be created.
///
/// # Example
///
/// ```rust,no_run
/// use fesnuk::{initialize, Config};
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// let app = initialize(&config)?;
/// let mut nooks = app.nooks();
/// # Ok::<(), fesnuk::FesnukError>(())
/// ```
pub fn initialize(config: &Config) -> Result<App> {
    observability::init_tracing(config);
    tracing::debug!(api = %config.api_base_url, data_dir = %config.data_dir.display(), "initializing fesnuk client");

    let api = api::HttpForumApi::new(config)?;
    let store = storage::JsonReactionStore::new(config.reactions_path())?;

    Ok(App::new(Arc::new(api), Arc::new(store), config.clone()))
}
