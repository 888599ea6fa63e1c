//! Post composer controller.
//!
//! Collects a title, body, target nook and images, validates them, uploads
//! the images one by one and finally creates the post.
//!
//! Progress runs from `0.0` to `0.8` across the uploads and reaches `1.0`
//! once the post exists.

use super::state::StateCell;
use crate::domain::error::{FesnukError, Result};
use crate::domain::{Attachment, Nook, NookId, PostId};
use crate::repository::{NookRepository, PostRepository};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;

/// Share of the progress bar spent on uploads.
const UPLOAD_SHARE: f32 = 0.8;

/// An image picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    /// Name of the file on the device, used for the extension.
    pub file_name: String,
    pub bytes: Arc<[u8]>,
}

impl SelectedImage {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self {
            file_name: file_name.into(),
            bytes: Arc::from(bytes),
        }
    }

    /// Reads an image from disk.
    ///
    /// # Errors
    ///
    /// Returns [`FesnukError::Io`] if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image.jpg".to_string(), |name| name.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes))
    }
}

/// Snapshot of the composer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposerUiState {
    pub nooks: Vec<Nook>,
    pub is_loading_nooks: bool,
    pub selected_nook: Option<Nook>,
    /// Nook to select once the nook list arrives.
    pub preselected_nook_id: Option<NookId>,
    pub title: String,
    pub content: String,
    pub selected_images: Vec<SelectedImage>,
    pub is_uploading_files: bool,
    pub is_creating_post: bool,
    /// Between `0.0` and `1.0`.
    pub upload_progress: f32,
    pub is_post_created: bool,
    pub created_post_id: Option<PostId>,
    pub error_message: Option<String>,
}

#[derive(Debug)]
pub struct ComposerController {
    nooks: NookRepository,
    posts: PostRepository,
    state: StateCell<ComposerUiState>,
}

impl ComposerController {
    #[must_use]
    pub fn new(nooks: NookRepository, posts: PostRepository) -> Self {
        Self {
            nooks,
            posts,
            state: StateCell::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ComposerUiState {
        self.state.state()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ComposerUiState> {
        self.state.subscribe()
    }

    /// Loads the nook picker and applies any pending preselection.
    pub async fn load_nooks(&mut self) {
        self.state.update(|s| {
            s.is_loading_nooks = true;
            s.error_message = None;
        });

        let span = tracing::debug_span!("composer_load_nooks");
        match self.nooks.get_all_nooks().instrument(span).await {
            Ok(nooks) => self.state.update(|s| {
                if let Some(id) = &s.preselected_nook_id {
                    if let Some(nook) = nooks.iter().find(|n| &n.id == id) {
                        s.selected_nook = Some(nook.clone());
                    }
                }
                s.nooks = nooks;
                s.is_loading_nooks = false;
            }),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load nooks for composer");
                self.state.update(|s| {
                    s.is_loading_nooks = false;
                    s.error_message = Some(e.to_string());
                });
            }
        }
    }

    pub fn update_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.state.update(|s| s.title = title);
    }

    pub fn update_content(&mut self, content: impl Into<String>) {
        let content = content.into();
        self.state.update(|s| s.content = content);
    }

    pub fn select_nook(&mut self, nook: Nook) {
        self.state.update(|s| s.selected_nook = Some(nook));
    }

    /// Selects a nook by id, now if it is loaded, otherwise when nooks arrive.
    pub fn select_nook_by_id(&mut self, nook_id: impl Into<NookId>) {
        let nook_id = nook_id.into();
        self.state.update(|s| {
            if let Some(nook) = s.nooks.iter().find(|n| n.id == nook_id) {
                s.selected_nook = Some(nook.clone());
            }
            s.preselected_nook_id = Some(nook_id);
        });
    }

    pub fn add_images<I>(&mut self, images: I)
    where
        I: IntoIterator<Item = SelectedImage>,
    {
        let images: Vec<_> = images.into_iter().collect();
        self.state.update(|s| s.selected_images.extend(images));
    }

    /// Removes the image at `index`. Out-of-range indices are ignored.
    pub fn remove_image(&mut self, index: usize) {
        self.state.update(|s| {
            if index < s.selected_images.len() {
                s.selected_images.remove(index);
            }
        });
    }

    /// Validates the form, uploads images and creates the post.
    ///
    /// Validation failures and upload failures stop before the post is
    /// created; the outcome is reported through the snapshot.
    pub async fn create_post(&mut self) {
        let form = self.state.state();
        let nook_id = match validate(&form) {
            Ok(nook) => nook.id.clone(),
            Err(e) => {
                tracing::debug!(error = %e, "post form rejected");
                self.state.update(|s| s.error_message = Some(e.to_string()));
                return;
            }
        };

        self.state.update(|s| {
            s.is_uploading_files = true;
            s.upload_progress = 0.0;
            s.error_message = None;
        });

        let Some(attachments) = self.upload_images(&form.selected_images).await else {
            return;
        };

        self.state.update(|s| {
            s.is_uploading_files = false;
            s.is_creating_post = true;
            s.upload_progress = UPLOAD_SHARE;
        });

        let span = tracing::debug_span!("create_post", nook_id = %nook_id, attachments = attachments.len());
        let created = self
            .posts
            .create_post(&form.title, &form.content, &nook_id, &attachments)
            .instrument(span)
            .await;

        match created {
            Ok(post) => {
                tracing::debug!(post_id = post.id, "post created");
                self.state.update(|s| {
                    s.is_creating_post = false;
                    s.upload_progress = 1.0;
                    s.is_post_created = true;
                    s.created_post_id = Some(post.id);
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to create post");
                self.state.update(|s| {
                    s.is_creating_post = false;
                    s.error_message = Some(format!("Failed to create post: {e}"));
                });
            }
        }
    }

    /// Uploads every image in order. Returns `None` after the first failure.
    async fn upload_images(&self, images: &[SelectedImage]) -> Option<Vec<Attachment>> {
        let mut attachments = Vec::with_capacity(images.len());

        #[allow(clippy::cast_precision_loss)]
        let total = images.len() as f32;

        for (index, image) in images.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let progress = index as f32 / total * UPLOAD_SHARE;
            self.state.update(|s| s.upload_progress = progress);

            match self.nooks.upload_file(image.bytes.to_vec(), &image.file_name).await {
                Ok(blob_name) => attachments.push(Attachment::image(blob_name, image.file_name.clone())),
                Err(e) => {
                    tracing::warn!(file = %image.file_name, error = %e, "image upload failed");
                    self.state.update(|s| {
                        s.is_uploading_files = false;
                        s.error_message = Some(format!("Failed to upload image: {e}"));
                    });
                    return None;
                }
            }
        }

        Some(attachments)
    }

    pub fn clear_error(&mut self) {
        self.state.update(|s| s.error_message = None);
    }

    /// Empties the form after a post was created. The nook list is kept.
    pub fn reset(&mut self) {
        self.state.update(|s| {
            s.title.clear();
            s.content.clear();
            s.selected_images.clear();
            s.selected_nook = None;
            s.is_post_created = false;
            s.created_post_id = None;
            s.upload_progress = 0.0;
            s.error_message = None;
        });
    }
}

/// Checks the form in display order and returns the target nook.
fn validate(form: &ComposerUiState) -> Result<&Nook> {
    let Some(nook) = &form.selected_nook else {
        return Err(FesnukError::Validation("Please select a nook".to_string()));
    };
    if form.title.trim().is_empty() {
        return Err(FesnukError::Validation("Please enter a title".to_string()));
    }
    if form.content.trim().is_empty() {
        return Err(FesnukError::Validation("Please enter content".to_string()));
    }
    Ok(nook)
}
