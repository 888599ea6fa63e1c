//! Wire records exchanged with the forum API.
//!
//! These types mirror the JSON the server speaks, field for field. They are
//! kept separate from the domain models so the wire format can drift without
//! touching controllers; repositories do the translation.

use crate::domain::{CommentId, PostId, ReactionAction};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Standard response envelope: `{message, status, data}`.
///
/// `data` is optional because acknowledgement endpoints (reactions, comments)
/// send `null` or omit it entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub status: i64,

    pub data: Option<T>,
}

/// A nook as the server sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NookRecord {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

/// An attachment entry inside a post record or a create-post request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    #[serde(rename = "type")]
    pub kind: String,

    pub format: String,

    /// Stored blob name.
    pub content: String,

    pub original_file_name: String,
}

/// A post as the server sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: PostId,

    pub title: String,

    #[serde(default)]
    pub content: String,

    pub nook_id: String,

    #[serde(default)]
    pub nook_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<AttachmentRecord>,

    #[serde(default)]
    pub comment_count: u32,

    /// Reaction tallies keyed by `U+XXXX` symbol.
    #[serde(default, deserialize_with = "null_as_default")]
    pub reactions: BTreeMap<String, u32>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

/// A root comment or reply as the server sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: CommentId,

    pub post_id: PostId,

    #[serde(default)]
    pub parent_id: Option<CommentId>,

    #[serde(default)]
    pub content: String,

    /// Comment attachments are not rendered by the client; kept opaque.
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<serde_json::Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub reactions: BTreeMap<String, u32>,

    #[serde(default)]
    pub reply_count: u32,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

/// Body of `POST posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub nook_id: String,
    pub attachments: Vec<AttachmentRecord>,
}

/// Body of `POST posts/react`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRequest {
    pub post_id: PostId,
    /// `U+XXXX` reaction symbol.
    pub unicode: String,
    /// Serialized as `1` or `-1`.
    pub action: ReactionAction,
}

/// Body of `POST comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRequest {
    pub post_id: PostId,
    pub content: String,
}

/// Body of `POST comments/reply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentReplyRequest {
    pub post_id: PostId,
    pub content: String,
    pub parent_id: CommentId,
}

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
