//! Nook domain model.
//!
//! A nook is a named topic community that owns posts.

use chrono::{DateTime, Utc};

/// Identifier of a nook as issued by the server.
pub type NookId = String;

/// A topic community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nook {
    pub id: NookId,
    pub name: String,
    pub description: String,
    /// Cover image. The API does not provide one yet, so this is `None` for
    /// every nook loaded from the server.
    pub background_image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Nook {
    /// Creates a nook with only the fields a picker needs.
    #[must_use]
    pub fn new(id: impl Into<NookId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            background_image_url: None,
            created_at: None,
            updated_at: None,
        }
    }
}
