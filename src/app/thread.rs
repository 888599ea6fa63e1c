//! Thread controller: one post, its comment tree and reply composer.

use super::comments::CommentTree;
use super::reactions::{self, HasReactions, PostReactions, ReactionBoard, ReactionPhase, ToggleRejected};
use super::state::StateCell;
use crate::domain::{CommentId, Post, PostId};
use crate::repository::{CommentRepository, PostRepository};
use crate::storage::ReactionStore;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;

/// Message shown when a comment or reply is blank.
const EMPTY_COMMENT: &str = "Please enter a comment";

/// Snapshot of the thread screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadUiState {
    pub post: Option<Post>,
    pub comments: CommentTree,
    /// Displayed reactions of the opened post.
    pub reactions: BTreeMap<PostId, PostReactions>,
    pub is_loading: bool,
    pub is_loading_comments: bool,
    /// Roots whose replies are being fetched.
    pub loading_replies: BTreeSet<CommentId>,
    pub is_posting_comment: bool,
    /// Failure loading the post.
    pub error_message: Option<String>,
    /// Failure loading or submitting comments and replies.
    pub comment_error_message: Option<String>,
    pub reaction_error: Option<String>,
    /// Draft of the reply being composed.
    pub reply_text: String,
}

impl HasReactions for ThreadUiState {
    fn reactions_mut(&mut self) -> &mut BTreeMap<PostId, PostReactions> {
        &mut self.reactions
    }

    fn reaction_error_mut(&mut self) -> &mut Option<String> {
        &mut self.reaction_error
    }
}

#[derive(Debug)]
pub struct ThreadController {
    posts: PostRepository,
    comments: CommentRepository,
    board: ReactionBoard,
    state: StateCell<ThreadUiState>,
}

impl ThreadController {
    #[must_use]
    pub fn new(posts: PostRepository, comments: CommentRepository, store: Arc<dyn ReactionStore>) -> Self {
        Self {
            posts,
            comments,
            board: ReactionBoard::new(store),
            state: StateCell::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ThreadUiState {
        self.state.state()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ThreadUiState> {
        self.state.subscribe()
    }

    /// Loads a post, then its root comments.
    ///
    /// Opening a different post than the one shown discards the comment tree.
    pub async fn load_post(&mut self, post_id: PostId) {
        self.state.update(|s| {
            if s.post.as_ref().is_some_and(|p| p.id != post_id) {
                s.post = None;
                s.comments.clear();
                s.reply_text.clear();
            }
            s.is_loading = true;
            s.error_message = None;
        });

        let span = tracing::debug_span!("load_post", post_id);
        match self.posts.get_post_by_id(post_id).instrument(span).await {
            Ok(post) => {
                self.board.sync_posts([(post.id, &post.reactions)]);
                let reactions = self.board.posts().clone();
                self.state.update(|s| {
                    s.post = Some(post);
                    s.reactions = reactions;
                    s.is_loading = false;
                });
                self.load_comments(post_id).await;
            }
            Err(e) => {
                tracing::warn!(post_id, error = %e, "failed to load post");
                self.state.update(|s| {
                    s.is_loading = false;
                    s.error_message = Some(e.to_string());
                });
            }
        }
    }

    /// Reloads the root comments of `post_id`.
    pub async fn load_comments(&mut self, post_id: PostId) {
        self.state.update(|s| {
            s.is_loading_comments = true;
            s.comment_error_message = None;
        });

        let span = tracing::debug_span!("load_comments", post_id);
        match self.comments.get_comments_by_post(post_id).instrument(span).await {
            Ok(roots) => self.state.update(|s| {
                s.comments.set_roots(roots);
                s.is_loading_comments = false;
            }),
            Err(e) => {
                tracing::warn!(post_id, error = %e, "failed to load comments");
                self.state.update(|s| {
                    s.is_loading_comments = false;
                    s.comment_error_message = Some(format!("Failed to load comments: {e}"));
                });
            }
        }
    }

    /// Fetches the replies of a root and caches them.
    ///
    /// On failure the cache entry stays absent, so the next expand retries.
    pub async fn load_replies(&mut self, comment_id: CommentId) {
        self.state.update(|s| {
            s.loading_replies.insert(comment_id);
        });

        let span = tracing::debug_span!("load_replies", comment_id);
        match self.comments.get_comment_replies(comment_id).instrument(span).await {
            Ok(replies) => self.state.update(|s| {
                s.comments.cache_replies(comment_id, replies);
                s.loading_replies.remove(&comment_id);
            }),
            Err(e) => {
                tracing::warn!(comment_id, error = %e, "failed to load replies");
                self.state.update(|s| {
                    s.loading_replies.remove(&comment_id);
                    s.comment_error_message = Some(format!("Failed to load replies: {e}"));
                });
            }
        }
    }

    /// Expands or collapses a root, fetching its replies on first expansion.
    pub async fn toggle_comment_expansion(&mut self, comment_id: CommentId) {
        let mut needs_fetch = false;
        self.state.update(|s| needs_fetch = s.comments.toggle_expansion(comment_id));
        tracing::debug!(comment_id, needs_fetch, "comment expansion toggled");

        if needs_fetch {
            self.load_replies(comment_id).await;
        }
    }

    /// Opens the reply composer on `comment_id` and expands it.
    pub async fn start_reply(&mut self, comment_id: CommentId) {
        let mut needs_fetch = false;
        self.state.update(|s| needs_fetch = s.comments.start_reply(comment_id));
        tracing::debug!(comment_id, needs_fetch, "reply started");

        if needs_fetch {
            self.load_replies(comment_id).await;
        }
    }

    pub fn cancel_reply(&mut self) {
        self.state.update(|s| s.comments.cancel_reply());
    }

    pub fn set_reply_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.state.update(|s| s.reply_text = text);
    }

    /// Posts a top-level comment and reloads the roots on success.
    pub async fn post_comment(&mut self, post_id: PostId, content: &str) {
        if content.trim().is_empty() {
            self.state.update(|s| s.comment_error_message = Some(EMPTY_COMMENT.to_string()));
            return;
        }

        self.state.update(|s| {
            s.is_posting_comment = true;
            s.comment_error_message = None;
        });

        let span = tracing::debug_span!("post_comment", post_id);
        match self.comments.create_comment(post_id, content).instrument(span).await {
            Ok(()) => {
                self.state.update(|s| s.is_posting_comment = false);
                self.load_comments(post_id).await;
            }
            Err(e) => {
                tracing::warn!(post_id, error = %e, "failed to post comment");
                self.state.update(|s| {
                    s.is_posting_comment = false;
                    s.comment_error_message = Some(format!("Failed to post comment: {e}"));
                });
            }
        }
    }

    /// Replies to a root comment.
    ///
    /// On success the reply target and draft are cleared, the roots are
    /// reloaded and the parent's replies refreshed. On failure both stay as
    /// they were so the user can retry.
    pub async fn reply_to_comment(&mut self, post_id: PostId, parent_id: CommentId, content: &str) {
        if content.trim().is_empty() {
            self.state.update(|s| s.comment_error_message = Some(EMPTY_COMMENT.to_string()));
            return;
        }

        self.state.update(|s| {
            s.is_posting_comment = true;
            s.comment_error_message = None;
        });

        let span = tracing::debug_span!("reply_to_comment", post_id, parent_id);
        match self.comments.reply_to_comment(post_id, parent_id, content).instrument(span).await {
            Ok(()) => {
                self.state.update(|s| {
                    s.is_posting_comment = false;
                    s.comments.cancel_reply();
                    s.reply_text.clear();
                });
                self.load_comments(post_id).await;
                self.load_replies(parent_id).await;
            }
            Err(e) => {
                tracing::warn!(post_id, parent_id, error = %e, "failed to post reply");
                self.state.update(|s| {
                    s.is_posting_comment = false;
                    s.comment_error_message = Some(format!("Failed to post reply: {e}"));
                });
            }
        }
    }

    /// Replies to the current reply target with the current draft.
    ///
    /// Does nothing when no reply is being composed or no post is open.
    pub async fn submit_reply(&mut self) {
        let snapshot = self.state.state();
        let (Some(post), Some(parent_id)) = (snapshot.post, snapshot.comments.replying_to()) else {
            tracing::debug!("no reply in progress");
            return;
        };
        self.reply_to_comment(post.id, parent_id, &snapshot.reply_text).await;
    }

    /// Reloads the post and its comments.
    pub async fn refresh(&mut self, post_id: PostId) {
        self.load_post(post_id).await;
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
