//! Home feed controller.

use super::reactions::{self, HasReactions, PostReactions, ReactionBoard, ReactionPhase, ToggleRejected};
use super::state::StateCell;
use crate::domain::{Post, PostId};
use crate::repository::PostRepository;
use crate::storage::ReactionStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;

/// Snapshot of the home feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedUiState {
    /// Every post, in server order.
    pub posts: Vec<Post>,
    /// Displayed reactions per post. Takes precedence over `Post::reactions`.
    pub reactions: BTreeMap<PostId, PostReactions>,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub reaction_error: Option<String>,
}

impl HasReactions for FeedUiState {
    fn reactions_mut(&mut self) -> &mut BTreeMap<PostId, PostReactions> {
        &mut self.reactions
    }

    fn reaction_error_mut(&mut self) -> &mut Option<String> {
        &mut self.reaction_error
    }
}

/// Loads the global feed and handles reactions on it.
#[derive(Debug)]
pub struct FeedController {
    posts: PostRepository,
    board: ReactionBoard,
    state: StateCell<FeedUiState>,
}

impl FeedController {
    #[must_use]
    pub fn new(posts: PostRepository, store: Arc<dyn ReactionStore>) -> Self {
        Self {
            posts,
            board: ReactionBoard::new(store),
            state: StateCell::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> FeedUiState {
        self.state.state()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedUiState> {
        self.state.subscribe()
    }

    /// Fetches the feed. Previously loaded posts stay visible while loading.
    pub async fn load_posts(&mut self) {
        self.state.update(|s| {
            s.is_loading = true;
            s.error_message = None;
        });

        let span = tracing::debug_span!("load_posts");
        match self.posts.get_all_posts().instrument(span).await {
            Ok(posts) => {
                self.board.sync_posts(posts.iter().map(|p| (p.id, &p.reactions)));
                let reactions = self.board.posts().clone();
                self.state.update(|s| {
                    s.posts = posts;
                    s.reactions = reactions;
                    s.is_loading = false;
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load feed");
                self.state.update(|s| {
                    s.is_loading = false;
                    s.error_message = Some(e.to_string());
                });
            }
        }
    }

    /// Pull-to-refresh; same as [`Self::load_posts`].
    pub async fn refresh_posts(&mut self) {
        self.load_posts().await;
    }

    /// Toggles the user's `symbol` reaction on a feed post.
    ///
    /// # Errors
    ///
    /// Returns [`ToggleRejected`] if the toggle was refused before any request.
    pub async fn toggle_reaction(&mut self, post_id: PostId, symbol: &str) -> Result<ReactionPhase, ToggleRejected> {
        reactions::toggle_reaction(&mut self.board, &self.state, &self.posts, post_id, symbol).await
    }

    pub fn clear_reaction_error(&mut self) {
        self.state.update(|s| s.reaction_error = None);
    }
}
