//! Post domain model.
//!
//! A post is a top-level submission inside a nook. The client only ever holds
//! a shadow copy: every change goes through a server round trip, and the
//! reaction map here is the server's tally at load time.

use super::nook::NookId;
use super::time::post_time_ago;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Identifier of a post as issued by the server.
pub type PostId = i64;

/// Reaction tallies keyed by `U+XXXX` symbol.
pub type ReactionCounts = BTreeMap<String, u32>;

/// A file attached to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Attachment kind, `"image"` for everything the composer uploads.
    pub kind: String,
    /// File extension without the dot (`"jpg"`).
    pub format: String,
    /// Stored blob name returned by the upload.
    pub content: String,
    /// Name of the file on the device it came from.
    pub original_file_name: String,
}

impl Attachment {
    /// Builds an image attachment for an uploaded blob.
    #[must_use]
    pub fn image(content: impl Into<String>, original_file_name: impl Into<String>) -> Self {
        let original_file_name = original_file_name.into();
        let format = file_extension(&original_file_name).unwrap_or("jpg").to_string();
        Self {
            kind: "image".to_string(),
            format,
            content: content.into(),
            original_file_name,
        }
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        self.kind == "image"
    }

    /// Public URL of the attachment under the given storage base URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use fesnuk::domain::Attachment;
    ///
    /// let attachment = Attachment::image("abc.png", "cat.png");
    /// assert_eq!(
    ///     attachment.url("https://cdn.example/attachments"),
    ///     "https://cdn.example/attachments/abc.png"
    /// );
    /// ```
    #[must_use]
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.content)
    }
}

/// Returns the extension of a file name, if it has a non-empty one.
#[must_use]
pub fn file_extension(file_name: &str) -> Option<&str> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// A forum post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub nook_id: NookId,
    pub nook_name: String,
    pub attachments: Vec<Attachment>,
    pub comment_count: u32,
    pub reactions: ReactionCounts,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Server tally for one reaction symbol, zero when absent.
    #[must_use]
    pub fn reaction_count(&self, symbol: &str) -> u32 {
        self.reactions.get(symbol).copied().unwrap_or(0)
    }

    /// Attachments that can be shown in the image carousel.
    pub fn images(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter().filter(|a| a.is_image())
    }

    /// Feed-style relative age of the post ("5m ago").
    #[must_use]
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        post_time_ago(self.created_at, now)
    }
}
