//! Nook detail controller: one nook and its posts.

use super::reactions::{self, HasReactions, PostReactions, ReactionBoard, ReactionPhase, ToggleRejected};
use super::state::StateCell;
use crate::domain::{Nook, Post, PostId};
use crate::repository::{NookRepository, PostRepository};
use crate::storage::ReactionStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;

/// Snapshot of the nook detail screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NookDetailUiState {
    pub nook: Option<Nook>,
    pub posts: Vec<Post>,
    pub reactions: BTreeMap<PostId, PostReactions>,
    /// The nook itself is loading.
    pub is_loading: bool,
    /// The nook's post list is loading.
    pub is_loading_posts: bool,
    pub error_message: Option<String>,
    pub reaction_error: Option<String>,
}

impl HasReactions for NookDetailUiState {
    fn reactions_mut(&mut self) -> &mut BTreeMap<PostId, PostReactions> {
        &mut self.reactions
    }

    fn reaction_error_mut(&mut self) -> &mut Option<String> {
        &mut self.reaction_error
    }
}

#[derive(Debug)]
pub struct NookDetailController {
    nooks: NookRepository,
    posts: PostRepository,
    board: ReactionBoard,
    state: StateCell<NookDetailUiState>,
}

impl NookDetailController {
    #[must_use]
    pub fn new(nooks: NookRepository, posts: PostRepository, store: Arc<dyn ReactionStore>) -> Self {
        Self {
            nooks,
            posts,
            board: ReactionBoard::new(store),
            state: StateCell::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> NookDetailUiState {
        self.state.state()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NookDetailUiState> {
        self.state.subscribe()
    }

    /// Loads the nook, then its posts. Posts are not requested if the nook
    /// itself fails to load.
    pub async fn load_nook_detail(&mut self, nook_id: &str) {
        self.state.update(|s| {
            s.is_loading = true;
            s.error_message = None;
        });

        let span = tracing::debug_span!("load_nook_detail", nook_id);
        match self.nooks.get_nook_by_id(nook_id).instrument(span).await {
            Ok(nook) => {
                self.state.update(|s| {
                    s.nook = Some(nook);
                    s.is_loading = false;
                });
                self.load_nook_posts(nook_id).await;
            }
            Err(e) => {
                tracing::warn!(nook_id, error = %e, "failed to load nook");
                self.state.update(|s| {
                    s.is_loading = false;
                    s.error_message = Some(e.to_string());
                });
            }
        }
    }

    pub async fn load_nook_posts(&mut self, nook_id: &str) {
        self.state.update(|s| s.is_loading_posts = true);

        let span = tracing::debug_span!("load_nook_posts", nook_id);
        match self.posts.get_posts_by_nook(nook_id).instrument(span).await {
            Ok(posts) => {
                self.board.sync_posts(posts.iter().map(|p| (p.id, &p.reactions)));
                let reactions = self.board.posts().clone();
                self.state.update(|s| {
                    s.posts = posts;
                    s.reactions = reactions;
                    s.is_loading_posts = false;
                });
            }
            Err(e) => {
                tracing::warn!(nook_id, error = %e, "failed to load nook posts");
                self.state.update(|s| {
                    s.is_loading_posts = false;
                    s.error_message = Some(e.to_string());
                });
            }
        }
    }

    pub async fn retry(&mut self, nook_id: &str) {
        self.load_nook_detail(nook_id).await;
    }

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
