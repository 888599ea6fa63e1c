//! Two-level comment tree with lazily loaded replies.
//!
//! Root comments are loaded eagerly, in server order. Replies are fetched per
//! root the first time it is expanded and cached afterwards; collapsing keeps
//! the cache. The reply index tells "never fetched" (no entry) apart from
//! "fetched, no replies" (empty entry).
//!
//! [`CommentTree`] is pure state. Methods that may require a fetch return
//! `true` when the caller should load replies for that root and hand them
//! back through [`CommentTree::cache_replies`].

use crate::domain::{Comment, CommentId};
use std::collections::{BTreeSet, HashMap};

/// Root comments, reply cache, expansion flags and the reply target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentTree {
    roots: Vec<Comment>,
    replies: HashMap<CommentId, Vec<Comment>>,
    expanded: BTreeSet<CommentId>,
    replying_to: Option<CommentId>,
}

impl CommentTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Root comments in server order.
    #[must_use]
    pub fn roots(&self) -> &[Comment] {
        &self.roots
    }

    /// Replaces the root list. Expansion flags and cached replies are kept.
    pub fn set_roots(&mut self, roots: Vec<Comment>) {
        self.roots = roots;
    }

    /// Cached replies of a root, `None` when they were never fetched.
    #[must_use]
    pub fn replies_for(&self, comment_id: CommentId) -> Option<&[Comment]> {
        self.replies.get(&comment_id).map(Vec::as_slice)
    }

    #[must_use]
    pub fn has_cached_replies(&self, comment_id: CommentId) -> bool {
        self.replies.contains_key(&comment_id)
    }

    /// Stores fetched replies under their root, replacing any earlier fetch.
    pub fn cache_replies(&mut self, comment_id: CommentId, replies: Vec<Comment>) {
        self.replies.insert(comment_id, replies);
    }

    #[must_use]
    pub fn is_expanded(&self, comment_id: CommentId) -> bool {
        self.expanded.contains(&comment_id)
    }

    #[must_use]
    pub const fn expanded(&self) -> &BTreeSet<CommentId> {
        &self.expanded
    }

    /// Expands a collapsed root or collapses an expanded one.
    ///
    /// Returns `true` if the root was expanded and its replies still need
    /// fetching.
    pub fn toggle_expansion(&mut self, comment_id: CommentId) -> bool {
        if self.is_expanded(comment_id) {
            self.collapse(comment_id);
            false
        } else {
            self.expand(comment_id)
        }
    }

    /// Expands a root. Returns `true` if its replies still need fetching.
    pub fn expand(&mut self, comment_id: CommentId) -> bool {
        self.expanded.insert(comment_id);
        !self.has_cached_replies(comment_id)
    }

    pub fn collapse(&mut self, comment_id: CommentId) {
        self.expanded.remove(&comment_id);
    }

    /// The comment the composer is replying to.
    #[must_use]
    pub const fn replying_to(&self) -> Option<CommentId> {
        self.replying_to
    }

    /// Targets `comment_id` for a reply and forces it expanded.
    ///
    /// Returns `true` if its replies still need fetching.
    pub fn start_reply(&mut self, comment_id: CommentId) -> bool {
        self.replying_to = Some(comment_id);
        self.expand(comment_id)
    }

    pub fn cancel_reply(&mut self) {
        self.replying_to = None;
    }

    /// Forgets everything, for when a different post is opened.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
