//! Remote API abstraction.
//!
//! This module defines the [`ForumApi`] trait that abstracts over the forum's
//! REST endpoints. Repositories depend on the trait, not on HTTP, so tests can
//! substitute a scripted implementation.
//!
//! # Design Philosophy
//!
//! The trait is a one-to-one map of the endpoints the client uses. Each method
//! returns wire records and a crate [`Result`]; success/failure is the only
//! outcome callers branch on.

use crate::api::models::{
    CommentRecord, CommentReplyRequest, CommentRequest, CreatePostRequest, NookRecord,
    PostRecord, ReactionRequest,
};
use crate::domain::error::Result;
use crate::domain::{CommentId, PostId};
use async_trait::async_trait;

/// Typed client for the forum's REST API.
///
/// # Implementations
///
/// - [`HttpForumApi`](crate::api::HttpForumApi): `reqwest` over HTTPS (default)
#[async_trait]
pub trait ForumApi: Send + Sync {
    /// `GET nooks`
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an empty body.
    async fn list_nooks(&self) -> Result<Vec<NookRecord>>;

    /// `GET nooks/{id}`
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an empty body.
    async fn get_nook(&self, nook_id: &str) -> Result<NookRecord>;

    /// `GET posts`, the global feed.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an empty body.
    async fn list_posts(&self) -> Result<Vec<PostRecord>>;

    /// `GET posts/nook/{nook_id}`
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an empty body.
    async fn list_posts_by_nook(&self, nook_id: &str) -> Result<Vec<PostRecord>>;

    /// `GET posts/{id}`
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an empty body.
    async fn get_post(&self, post_id: PostId) -> Result<PostRecord>;

    /// `POST posts`. Returns the created post.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an empty body.
    async fn create_post(&self, request: &CreatePostRequest) -> Result<PostRecord>;

    /// `POST posts/react`. Only the status code matters.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    async fn react(&self, request: &ReactionRequest) -> Result<()>;

    /// `POST comments`. Only the status code matters.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    async fn post_comment(&self, request: &CommentRequest) -> Result<()>;

    /// `POST comments/reply`. Only the status code matters.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    async fn reply_to_comment(&self, request: &CommentReplyRequest) -> Result<()>;

    /// `GET comments/post/{post_id}`: root comments in server order.
    ///
    /// A missing body or `null` data is an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    async fn list_comments(&self, post_id: PostId) -> Result<Vec<CommentRecord>>;

    /// `GET comments/{comment_id}/replies`: direct replies in server order.
    ///
    /// A missing body or `null` data is an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    async fn list_replies(&self, comment_id: CommentId) -> Result<Vec<CommentRecord>>;

    /// `PUT` raw bytes to a pre-signed blob URL.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    async fn upload_file(&self, url: &str, bytes: Vec<u8>) -> Result<()>;
}
