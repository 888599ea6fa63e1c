//! Domain layer for the Fesnuk client.
//!
//! This module contains the core domain types, independent of the wire format
//! or of any presentation concern. Repositories translate API records into
//! these types; controllers only ever see these types.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`nook`]: Topic communities
//! - [`post`]: Posts, attachments and reaction tallies
//! - [`comment`]: Root comments and replies
//! - [`reaction`]: Reaction symbols, the signed action and the picker palette
//! - [`time`]: Timestamp parsing and relative time labels

pub mod comment;
pub mod error;
pub mod nook;
pub mod post;
pub mod reaction;
pub mod time;

pub use comment::{Comment, CommentId};
pub use error::{FesnukError, Result};
pub use nook::{Nook, NookId};
pub use post::{file_extension, Attachment, Post, PostId, ReactionCounts};
pub use reaction::{find_choice, symbol_to_emoji, EmojiChoice, ReactionAction, COMMON_REACTIONS};
