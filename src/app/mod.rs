//! Application layer: one controller per screen.
//!
//! This module sits between a presentation layer and the repositories. Each
//! controller owns an observable snapshot of its screen and exposes the user
//! intents of that screen as methods.
//!
//! # Architecture
//!
//! The application layer follows a unidirectional data flow pattern:
//!
//! ```text
//! User Intent → Controller → Optimistic Snapshot → Repository → API
//!                   ↑                                            ↓
//!                   └───────── Reconciled Snapshot ◀── Outcome ──┘
//! ```
//!
//! Every transition replaces the snapshot as a whole (see [`StateCell`]).
//! Controller methods take `&mut self`, so each screen has a single writer.
//! Dropping an in-flight future abandons the request and applies nothing
//! further.
//!
//! # Modules
//!
//! - [`state`]: Snapshot cell
//! - [`reactions`]: Optimistic reaction toggling with rollback
//! - [`comments`]: Two-level comment tree with lazy replies
//! - [`feed`], [`nooks`], [`nook_detail`], [`thread`], [`composer`]: Screen controllers
//!
//! # Example
//!
//! ```rust,no_run
//! use fesnuk::{initialize, Config};
//!
//! # async fn run() -> fesnuk::Result<()> {
//! let app = initialize(&Config::default())?;
//!
//! let mut feed = app.feed();
//! feed.load_posts().await;
//! for post in &feed.state().posts {
//!     let _ = feed.toggle_reaction(post.id, "U+1F44D").await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod comments;
pub mod composer;
pub mod feed;
pub mod nook_detail;
pub mod nooks;
pub mod reactions;
pub mod state;
pub mod thread;

pub use comments::CommentTree;
pub use composer::{ComposerController, ComposerUiState, SelectedImage};
pub use feed::{FeedController, FeedUiState};
pub use nook_detail::{NookDetailController, NookDetailUiState};
pub use nooks::{filter_nooks, NooksController, NooksUiState};
pub use reactions::{HasReactions, PendingToggle, PostReactions, ReactionBoard, ReactionPhase, ToggleRejected};
pub use state::StateCell;
pub use thread::{ThreadController, ThreadUiState};

use crate::api::ForumApi;
use crate::domain::Attachment;
use crate::repository::{CommentRepository, NookRepository, PostRepository};
use crate::storage::ReactionStore;
use crate::Config;
use std::sync::Arc;

/// Shared collaborators every controller is built from.
///
/// Cheap to clone. Controllers created from the same `App` share one API
/// client and one reaction store.
#[derive(Clone)]
pub struct App {
    api: Arc<dyn ForumApi>,
    store: Arc<dyn ReactionStore>,
    config: Config,
}

impl App {
    #[must_use]
    pub fn new(api: Arc<dyn ForumApi>, store: Arc<dyn ReactionStore>, config: Config) -> Self {
        Self { api, store, config }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The process-wide reaction store.
    #[must_use]
    pub fn store(&self) -> Arc<dyn ReactionStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn nook_repository(&self) -> NookRepository {
        NookRepository::new(Arc::clone(&self.api), self.config.upload_url_template.clone())
    }

    #[must_use]
    pub fn post_repository(&self) -> PostRepository {
        PostRepository::new(Arc::clone(&self.api))
    }

    #[must_use]
    pub fn comment_repository(&self) -> CommentRepository {
        CommentRepository::new(Arc::clone(&self.api))
    }

    #[must_use]
    pub fn feed(&self) -> FeedController {
        FeedController::new(self.post_repository(), self.store())
    }

    #[must_use]
    pub fn nooks(&self) -> NooksController {
        NooksController::new(self.nook_repository())
    }

    #[must_use]
    pub fn nook_detail(&self) -> NookDetailController {
        NookDetailController::new(self.nook_repository(), self.post_repository(), self.store())
    }

    #[must_use]
    pub fn thread(&self) -> ThreadController {
        ThreadController::new(self.post_repository(), self.comment_repository(), self.store())
    }

    #[must_use]
    pub fn composer(&self) -> ComposerController {
        ComposerController::new(self.nook_repository(), self.post_repository())
    }

    /// Public URL of an attachment.
    #[must_use]
    pub fn attachment_url(&self, attachment: &Attachment) -> String {
        attachment.url(&self.config.attachment_base_url)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").field("config", &self.config).finish_non_exhaustive()
    }
}
