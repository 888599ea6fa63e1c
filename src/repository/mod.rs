//! Repositories translating wire records into domain types.
//!
//! Each repository holds a shared handle to a [`ForumApi`](crate::api::ForumApi)
//! and exposes the calls a screen needs, returning domain types. Failures are
//! passed through untouched; controllers decide how to surface them.

pub mod comments;
pub mod nooks;
pub mod posts;

pub use comments::CommentRepository;
pub use nooks::NookRepository;
pub use posts::PostRepository;

use crate::domain::time::parse_timestamp;
use chrono::{DateTime, Utc};

/// Parses a wire timestamp, treating blank strings as absent.
fn timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.trim().is_empty() {
        return None;
    }
    parse_timestamp(raw)
}
