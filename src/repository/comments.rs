//! Comment listing and submission.

use super::timestamp;
use crate::api::models::{CommentRecord, CommentReplyRequest, CommentRequest};
use crate::api::ForumApi;
use crate::domain::error::Result;
use crate::domain::{Comment, CommentId, PostId};
use std::sync::Arc;

/// Access to comments and replies.
#[derive(Clone)]
pub struct CommentRepository {
    api: Arc<dyn ForumApi>,
}

impl CommentRepository {
    #[must_use]
    pub fn new(api: Arc<dyn ForumApi>) -> Self {
        Self { api }
    }

    /// Root comments of a post, in server order.
    ///
    /// # Errors
    ///
    /// Propagates any API failure.
    pub async fn get_comments_by_post(&self, post_id: PostId) -> Result<Vec<Comment>> {
        let records = self.api.list_comments(post_id).await?;
        tracing::debug!(post_id, count = records.len(), "comments fetched");
        Ok(records.into_iter().map(record_to_comment).collect())
    }

    /// Direct replies to a root comment, in server order.
    ///
    /// # Errors
    ///
    /// Propagates any API failure.
    pub async fn get_comment_replies(&self, comment_id: CommentId) -> Result<Vec<Comment>> {
        let records = self.api.list_replies(comment_id).await?;
        tracing::debug!(comment_id, count = records.len(), "replies fetched");
        Ok(records.into_iter().map(record_to_comment).collect())
    }

    /// # Errors
    ///
    /// Propagates any API failure.
    pub async fn create_comment(&self, post_id: PostId, content: &str) -> Result<()> {
        let request = CommentRequest {
            post_id,
            content: content.to_string(),
        };
        self.api.post_comment(&request).await
    }

    /// # Errors
    ///
    /// Propagates any API failure.
    pub async fn reply_to_comment(&self, post_id: PostId, parent_id: CommentId, content: &str) -> Result<()> {
        let request = CommentReplyRequest {
            post_id,
            content: content.to_string(),
            parent_id,
        };
        self.api.reply_to_comment(&request).await
    }
}

impl std::fmt::Debug for CommentRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentRepository").finish_non_exhaustive()
    }
}

fn record_to_comment(record: CommentRecord) -> Comment {
    Comment {
        id: record.id,
        post_id: record.post_id,
        parent_id: record.parent_id,
        content: record.content,
        reactions: record.reactions,
        reply_count: record.reply_count,
        created_at: timestamp(&record.created_at),
        updated_at: timestamp(&record.updated_at),
    }
}
