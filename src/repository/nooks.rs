//! Nook lookups and attachment uploads.

use super::timestamp;
use crate::api::models::NookRecord;
use crate::api::ForumApi;
use crate::domain::error::Result;
use crate::domain::{file_extension, Nook};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Placeholder replaced by the generated blob name in the upload template.
const NAME_PLACEHOLDER: &str = "{name}";

/// Access to nooks, plus the blob upload used by the post composer.
#[derive(Clone)]
pub struct NookRepository {
    api: Arc<dyn ForumApi>,
    upload_url_template: String,
}

impl NookRepository {
    /// `upload_url_template` is a pre-signed URL containing a `{name}`
    /// placeholder for the blob name.
    #[must_use]
    pub fn new(api: Arc<dyn ForumApi>, upload_url_template: impl Into<String>) -> Self {
        Self {
            api,
            upload_url_template: upload_url_template.into(),
        }
    }

    /// Fetches every nook, in server order.
    ///
    /// # Errors
    ///
    /// Propagates any API failure.
    pub async fn get_all_nooks(&self) -> Result<Vec<Nook>> {
        let records = self.api.list_nooks().await?;
        tracing::debug!(count = records.len(), "nooks fetched");
        Ok(records.into_iter().map(record_to_nook).collect())
    }

    /// Fetches one nook.
    ///
    /// # Errors
    ///
    /// Propagates any API failure.
    pub async fn get_nook_by_id(&self, nook_id: &str) -> Result<Nook> {
        self.api.get_nook(nook_id).await.map(record_to_nook)
    }

    /// Uploads an attachment and returns the generated blob name.
    ///
    /// The blob is named `{uuid}.{ext}`, with the extension taken from
    /// `original_file_name` (`jpg` when it has none).
    ///
    /// # Errors
    ///
    /// Propagates any upload failure.
    pub async fn upload_file(&self, bytes: Vec<u8>, original_file_name: &str) -> Result<String> {
        let extension = file_extension(original_file_name).unwrap_or("jpg");
        let blob_name = format!("{}.{extension}", Uuid::new_v4());
        let url = self.upload_url(&blob_name);

        let span = tracing::debug_span!("upload_file", blob = %blob_name, size = bytes.len());
        self.api.upload_file(&url, bytes).instrument(span).await?;
        tracing::debug!(blob = %blob_name, "attachment uploaded");

        Ok(blob_name)
    }

    /// Upload URL for a blob name.
    #[must_use]
    pub fn upload_url(&self, blob_name: &str) -> String {
        self.upload_url_template.replace(NAME_PLACEHOLDER, blob_name)
    }
}

impl std::fmt::Debug for NookRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NookRepository").finish_non_exhaustive()
    }
}

/// Converts a wire nook into the domain model.
///
/// The API has no cover images, so `background_image_url` is always `None`.
fn record_to_nook(record: NookRecord) -> Nook {
    Nook {
        id: record.id,
        name: record.name,
        description: record.description,
        background_image_url: None,
        created_at: timestamp(&record.created_at),
        updated_at: timestamp(&record.updated_at),
    }
}
