//! Local reaction store abstraction.
//!
//! This module defines the [`ReactionStore`] trait: a process-wide record of
//! which reaction symbols the current user has applied to which post. It is
//! advisory client-side state, reconciled against the server by
//! [`crate::app::reactions`], never authoritative.
//!
//! # Design Philosophy
//!
//! The trait is deliberately small (read a set, add, remove) and infallible
//! on the read side: an unreadable or corrupt record is reported as "no
//! reactions" so that storage trouble never surfaces as a UI error.

use crate::domain::error::Result;
use crate::domain::PostId;
use std::collections::BTreeSet;

/// Persistent per-post reaction membership.
///
/// Implementations are shared between screen controllers behind an
/// `Arc<dyn ReactionStore>` and must be safe to call from any thread.
///
/// # Implementations
///
/// - [`JsonReactionStore`](crate::storage::JsonReactionStore): JSON file with atomic writes (default)
/// - [`MemoryReactionStore`](crate::storage::MemoryReactionStore): process-local, for tests and ephemeral sessions
pub trait ReactionStore: Send + Sync {
    /// Returns the symbols the user has applied to `post_id`.
    ///
    /// Read or parse failures yield the empty set.
    fn get_user_reactions(&self, post_id: PostId) -> BTreeSet<String>;

    /// Records that the user applied `symbol` to `post_id`.
    ///
    /// Returns `Ok(false)` when the symbol was already recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be persisted.
    fn add_user_reaction(&self, post_id: PostId, symbol: &str) -> Result<bool>;

    /// Forgets that the user applied `symbol` to `post_id`.
    ///
    /// Returns `Ok(false)` when the symbol was not recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be persisted.
    fn remove_user_reaction(&self, post_id: PostId, symbol: &str) -> Result<bool>;

    /// Drops every recorded reaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be persisted.
    fn clear_all(&self) -> Result<()>;

    /// Returns `true` if the user has applied `symbol` to `post_id`.
    fn has_user_reacted(&self, post_id: PostId, symbol: &str) -> bool {
        self.get_user_reactions(post_id).contains(symbol)
    }

    /// Adds the symbol if absent, removes it if present.
    ///
    /// Returns `true` if the reaction was added, `false` if it was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be persisted.
    fn toggle_reaction(&self, post_id: PostId, symbol: &str) -> Result<bool> {
        if self.has_user_reacted(post_id, symbol) {
            self.remove_user_reaction(post_id, symbol)?;
            Ok(false)
        } else {
            self.add_user_reaction(post_id, symbol)?;
            Ok(true)
        }
    }
}

/// Storage key for a post's reaction set.
#[must_use]
pub fn post_key(post_id: PostId) -> String {
    format!("post_{post_id}")
}
