//! Remote API layer.
//!
//! This module provides the abstraction over the forum's REST API and its
//! HTTP implementation.
//!
//! # Modules
//!
//! - `backend`: [`ForumApi`] trait, one method per endpoint
//! - `http`: [`HttpForumApi`], the `reqwest` implementation
//! - `models`: wire records and request bodies

pub mod backend;
pub mod http;
pub mod models;

pub use backend::ForumApi;
pub use http::HttpForumApi;
pub use models::{
    ApiEnvelope, AttachmentRecord, CommentRecord, CommentReplyRequest, CommentRequest,
    CreatePostRequest, NookRecord, PostRecord, ReactionRequest,
};
