//! JSON file-based reaction store.
//!
//! This module provides a simple, human-readable store for reaction membership
//! using JSON serialization. It uses atomic file writes (write-to-temp + rename)
//! to prevent corruption on crashes.
//!
//! # Performance Characteristics
//!
//! - **Read**: O(log n) - the whole file is loaded into memory once
//! - **Write**: O(n) - serializes and writes the entire dataset
//! - **Best for**: the few thousand posts a single device ever reacts to

use crate::domain::error::{FesnukError, Result};
use crate::domain::PostId;
use crate::storage::backend::{post_key, ReactionStore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// JSON storage container format.
///
/// Top-level structure serialized to disk. Reaction sets are keyed by
/// `post_{id}` so the file reads like the key-value store it models.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageData {
    /// Version of the storage format for future migrations.
    version: u32,

    /// Symbol sets keyed by `post_{id}`.
    #[serde(default)]
    reactions: BTreeMap<String, BTreeSet<String>>,
}

impl Default for StorageData {
    fn default() -> Self {
        Self {
            version: 1,
            reactions: BTreeMap::new(),
        }
    }
}

/// JSON file reaction store.
///
/// The entire dataset is kept in memory behind a mutex and persisted after
/// every change.
///
/// # File Format
///
/// ```json
/// {
///   "version": 1,
///   "reactions": {
///     "post_12": ["U+1F44D", "U+1F525"]
///   }
/// }
/// ```
pub struct JsonReactionStore {
    /// Path to the JSON file on disk.
    file_path: PathBuf,

    /// In-memory data, loaded on creation.
    data: Mutex<StorageData>,
}

impl JsonReactionStore {
    /// Creates or opens a JSON reaction store.
    ///
    /// If the file exists, loads existing data. A file that cannot be read or
    /// parsed is treated as empty and overwritten on the next change. Parent
    /// directories are created automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fesnuk::storage::{JsonReactionStore, ReactionStore};
    /// use std::path::PathBuf;
    ///
    /// let store = JsonReactionStore::new(PathBuf::from("/tmp/reactions.json"))?;
    /// store.add_user_reaction(12, "U+1F44D")?;
    /// assert!(store.has_user_reacted(12, "U+1F44D"));
    /// # Ok::<(), fesnuk::FesnukError>(())
    /// ```
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON reaction store");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "unreadable reaction store, starting empty");
                StorageData::default()
            })
        } else {
            tracing::debug!("initializing new empty reaction store");
            StorageData::default()
        };

        tracing::debug!(post_count = data.reactions.len(), "reaction store initialized");

        Ok(Self {
            file_path,
            data: Mutex::new(data),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_file(path: &Path) -> Result<StorageData> {
        let contents = std::fs::read_to_string(path)?;
        let data: StorageData = serde_json::from_str(&contents)
            .map_err(|e| FesnukError::Storage(format!("failed to parse JSON: {e}")))?;

        tracing::debug!(version = data.version, posts = data.reactions.len(), "loaded reaction data");

        Ok(data)
    }

    /// Saves storage data to disk using atomic write.
    ///
    /// Writes to a temporary file first, then renames it over the target path.
    fn save_to_file(&self, data: &StorageData) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| FesnukError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        tracing::trace!("reaction store saved");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, StorageData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `change` to the set for `post_id` and persists if it reports a change.
    ///
    /// The in-memory copy only moves forward once the file write succeeds.
    fn modify<F>(&self, post_id: PostId, change: F) -> Result<bool>
    where
        F: FnOnce(&mut BTreeSet<String>) -> bool,
    {
        let mut data = self.lock();
        let key = post_key(post_id);
        let mut set = data.reactions.get(&key).cloned().unwrap_or_default();
        if !change(&mut set) {
            return Ok(false);
        }

        let mut next = data.clone();
        if set.is_empty() {
            next.reactions.remove(&key);
        } else {
            next.reactions.insert(key, set);
        }
        self.save_to_file(&next)?;
        *data = next;
        Ok(true)
    }
}

impl ReactionStore for JsonReactionStore {
    fn get_user_reactions(&self, post_id: PostId) -> BTreeSet<String> {
        let data = self.lock();
        data.reactions.get(&post_key(post_id)).cloned().unwrap_or_default()
    }

    fn add_user_reaction(&self, post_id: PostId, symbol: &str) -> Result<bool> {
        let _span = tracing::debug_span!("json_add_user_reaction", post_id, symbol).entered();

        let added = self.modify(post_id, |set| set.insert(symbol.to_string()))?;
        if !added {
            tracing::debug!("reaction already recorded");
        }
        Ok(added)
    }

    fn remove_user_reaction(&self, post_id: PostId, symbol: &str) -> Result<bool> {
        let _span = tracing::debug_span!("json_remove_user_reaction", post_id, symbol).entered();

        let removed = self.modify(post_id, |set| set.remove(symbol))?;
        if !removed {
            tracing::debug!("reaction not recorded, nothing to remove");
        }
        Ok(removed)
    }

    fn clear_all(&self) -> Result<()> {
        let mut data = self.lock();
        let next = StorageData {
            version: data.version,
            reactions: BTreeMap::new(),
        };
        self.save_to_file(&next)?;
        *data = next;
        Ok(())
    }
}

impl std::fmt::Debug for JsonReactionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonReactionStore")
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonReactionStore {
        JsonReactionStore::new(dir.path().join("nested").join("reactions.json")).unwrap()
    }

    #[test]
    fn reactions_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = store_in(&dir);
            assert!(store.add_user_reaction(12, "U+1F44D").unwrap());
            assert!(store.add_user_reaction(12, "U+1F525").unwrap());
            assert!(store.add_user_reaction(13, "U+2764").unwrap());
        }

        let reopened = store_in(&dir);
        let symbols: Vec<_> = reopened.get_user_reactions(12).into_iter().collect();
        assert_eq!(symbols, vec!["U+1F44D", "U+1F525"]);
        assert!(reopened.has_user_reacted(13, "U+2764"));
    }

    #[test]
    fn duplicate_add_and_missing_remove_report_no_change() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.add_user_reaction(1, "U+1F44D").unwrap());
        assert!(!store.add_user_reaction(1, "U+1F44D").unwrap());
        assert!(!store.remove_user_reaction(1, "U+1F44E").unwrap());
        assert!(store.remove_user_reaction(1, "U+1F44D").unwrap());
        assert!(store.get_user_reactions(1).is_empty());
    }

    #[test]
    fn corrupt_file_reads_as_no_reactions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reactions.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonReactionStore::new(path.clone()).unwrap();
        assert!(store.get_user_reactions(5).is_empty());

        store.add_user_reaction(5, "U+1F389").unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("post_5"));
    }

    #[test]
    fn toggle_and_clear() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.toggle_reaction(2, "U+1F602").unwrap());
        assert!(!store.toggle_reaction(2, "U+1F602").unwrap());
        store.add_user_reaction(3, "U+1F602").unwrap();
        store.clear_all().unwrap();
        assert!(!store.has_user_reacted(3, "U+1F602"));
    }

    #[test]
    fn failed_write_leaves_memory_matching_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reactions.json");
        let store = JsonReactionStore::new(path.clone()).unwrap();
        store.add_user_reaction(4, "U+1F44D").unwrap();

        // A directory in the temp file's place makes every save fail.
        std::fs::create_dir(dir.path().join("reactions.tmp")).unwrap();

        assert!(store.add_user_reaction(5, "U+1F44D").is_err());
        assert!(!store.has_user_reacted(5, "U+1F44D"));
        assert!(store.remove_user_reaction(4, "U+1F44D").is_err());
        assert!(store.has_user_reacted(4, "U+1F44D"));
        assert!(store.clear_all().is_err());
        assert!(store.has_user_reacted(4, "U+1F44D"));

        let reopened = JsonReactionStore::new(path).unwrap();
        assert!(!reopened.has_user_reacted(5, "U+1F44D"));
        assert!(reopened.has_user_reacted(4, "U+1F44D"));
    }
}
