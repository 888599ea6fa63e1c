//! Post feeds, post lookup, creation and reactions.

use super::timestamp;
use crate::api::models::{AttachmentRecord, CreatePostRequest, PostRecord, ReactionRequest};
use crate::api::ForumApi;
use crate::domain::error::Result;
use crate::domain::{Attachment, Post, PostId, ReactionAction};
use std::sync::Arc;

/// Access to posts.
#[derive(Clone)]
pub struct PostRepository {
    api: Arc<dyn ForumApi>,
}

impl PostRepository {
    #[must_use]
    pub fn new(api: Arc<dyn ForumApi>) -> Self {
        Self { api }
    }

    /// The global feed, in server order.
    ///
    /// # Errors
    ///
    /// Propagates any API failure.
    pub async fn get_all_posts(&self) -> Result<Vec<Post>> {
        let records = self.api.list_posts().await?;
        tracing::debug!(count = records.len(), "posts fetched");
        Ok(records.into_iter().map(record_to_post).collect())
    }

    /// The feed of a single nook.
    ///
    /// # Errors
    ///
    /// Propagates any API failure.
    pub async fn get_posts_by_nook(&self, nook_id: &str) -> Result<Vec<Post>> {
        let records = self.api.list_posts_by_nook(nook_id).await?;
        tracing::debug!(nook_id, count = records.len(), "nook posts fetched");
        Ok(records.into_iter().map(record_to_post).collect())
    }

    /// # Errors
    ///
    /// Propagates any API failure.
    pub async fn get_post_by_id(&self, post_id: PostId) -> Result<Post> {
        self.api.get_post(post_id).await.map(record_to_post)
    }

    /// Creates a post whose attachments have already been uploaded.
    ///
    /// # Errors
    ///
    /// Propagates any API failure.
    pub async fn create_post(
        &self,
        title: &str,
        content: &str,
        nook_id: &str,
        attachments: &[Attachment],
    ) -> Result<Post> {
        let request = CreatePostRequest {
            title: title.to_string(),
            content: content.to_string(),
            nook_id: nook_id.to_string(),
            attachments: attachments.iter().map(attachment_to_record).collect(),
        };
        self.api.create_post(&request).await.map(record_to_post)
    }

    /// Sends a signed reaction for `symbol` on `post_id`.
    ///
    /// # Errors
    ///
    /// Propagates any API failure.
    pub async fn react_to_post(&self, post_id: PostId, symbol: &str, action: ReactionAction) -> Result<()> {
        let request = ReactionRequest {
            post_id,
            unicode: symbol.to_string(),
            action,
        };
        self.api.react(&request).await
    }
}

impl std::fmt::Debug for PostRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostRepository").finish_non_exhaustive()
    }
}

fn record_to_post(record: PostRecord) -> Post {
    Post {
        id: record.id,
        title: record.title,
        content: record.content,
        nook_id: record.nook_id,
        nook_name: record.nook_name,
        attachments: record.attachments.into_iter().map(record_to_attachment).collect(),
        comment_count: record.comment_count,
        reactions: record.reactions,
        created_at: timestamp(&record.created_at),
        updated_at: timestamp(&record.updated_at),
    }
}

fn record_to_attachment(record: AttachmentRecord) -> Attachment {
    Attachment {
        kind: record.kind,
        format: record.format,
        content: record.content,
        original_file_name: record.original_file_name,
    }
}

fn attachment_to_record(attachment: &Attachment) -> AttachmentRecord {
    AttachmentRecord {
        kind: attachment.kind.clone(),
        format: attachment.format.clone(),
        content: attachment.content.clone(),
        original_file_name: attachment.original_file_name.clone(),
    }
}
