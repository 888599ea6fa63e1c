//! Comment domain model.
//!
//! Comments form a two-level tree: root comments hang off a post, replies hang
//! off a root. Nothing deeper is ever fetched.

use super::post::{PostId, ReactionCounts};
use super::time::comment_time_ago;
use chrono::{DateTime, Utc};

/// Identifier of a comment as issued by the server.
pub type CommentId = i64;

/// A root comment or a direct reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    /// `None` for root comments.
    pub parent_id: Option<CommentId>,
    pub content: String,
    pub reactions: ReactionCounts,
    pub reply_count: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Comment {
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Thread-style relative age of the comment ("5m", "Oct 05").
    #[must_use]
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        comment_time_ago(self.created_at, now)
    }
}
