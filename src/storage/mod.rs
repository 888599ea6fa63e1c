//! Storage layer for local reaction membership.
//!
//! This module provides the process-wide record of which emoji the current
//! user has applied to which post. It is the only state shared between screen
//! controllers.
//!
//! # Modules
//!
//! - `backend`: [`ReactionStore`] trait
//! - `json`: JSON file implementation with atomic writes
//! - `memory`: in-memory implementation

pub mod backend;
pub mod json;
pub mod memory;

pub use backend::{post_key, ReactionStore};
pub use json::JsonReactionStore;
pub use memory::MemoryReactionStore;
