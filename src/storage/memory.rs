//! In-memory reaction store.
//!
//! Same contract as the JSON store without touching the filesystem. Used by
//! tests and by callers that want reactions forgotten at process exit.

use crate::domain::error::Result;
use crate::domain::PostId;
use crate::storage::backend::ReactionStore;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Process-local reaction store.
#[derive(Debug, Default)]
pub struct MemoryReactionStore {
    reactions: Mutex<HashMap<PostId, BTreeSet<String>>>,
}

impl MemoryReactionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with reactions, handy for fixtures.
    #[must_use]
    pub fn with_reactions<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (PostId, S)>,
        S: Into<String>,
    {
        let store = Self::new();
        {
            let mut reactions = store.lock();
            for (post_id, symbol) in entries {
                reactions.entry(post_id).or_default().insert(symbol.into());
            }
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PostId, BTreeSet<String>>> {
        self.reactions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReactionStore for MemoryReactionStore {
    fn get_user_reactions(&self, post_id: PostId) -> BTreeSet<String> {
        self.lock().get(&post_id).cloned().unwrap_or_default()
    }

    fn add_user_reaction(&self, post_id: PostId, symbol: &str) -> Result<bool> {
        Ok(self.lock().entry(post_id).or_default().insert(symbol.to_string()))
    }

    fn remove_user_reaction(&self, post_id: PostId, symbol: &str) -> Result<bool> {
        let mut reactions = self.lock();
        let Some(set) = reactions.get_mut(&post_id) else {
            return Ok(false);
        };
        let removed = set.remove(symbol);
        if set.is_empty() {
            reactions.remove(&post_id);
        }
        Ok(removed)
    }

    fn clear_all(&self) -> Result<()> {
        self.lock().clear();
        Ok(())
    }
}
