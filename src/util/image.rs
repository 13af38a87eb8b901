//! Product image helpers: source resolution, staged uploads, and previews.
//!
//! DESIGN
//! ======
//! A staged image owns a [`PreviewHandle`]. Handles are counted by a shared
//! [`PreviewTracker`] and released on drop, so replacing the attachment,
//! resetting the form, or dropping the whole view frees the preview without
//! any explicit bookkeeping at call sites.

#[cfg(test)]
#[path = "image_test.rs"]
mod image_test;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::net::types::ImageUpload;

/// Extensions accepted by the upload field, with their MIME types.
const ACCEPTED_TYPES: [(&str, &str); 4] = [
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
];

/// Resolve an `imagen_url` into something displayable.
///
/// Absolute URLs pass through; relative paths are joined to the API base
/// with one leading slash removed. Empty references resolve to `None`.
#[must_use]
pub fn resolve_image_src(api_base: &str, image_url: Option<&str>) -> Option<String> {
    let url = image_url.filter(|url| !url.is_empty())?;
    if url.starts_with("http") {
        return Some(url.to_owned());
    }
    let path = url.strip_prefix('/').unwrap_or(url);
    Some(format!("{}/{path}", api_base.trim_end_matches('/')))
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("unsupported image type for '{0}' (use jpeg, jpg, png or webp)")]
    UnsupportedType(String),
    #[error("could not read image '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// MIME type for an accepted image path, by extension.
///
/// # Errors
///
/// Returns [`ImageError::UnsupportedType`] for anything outside jpeg/jpg/png/webp.
pub fn mime_for(path: &Path) -> Result<&'static str, ImageError> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    ACCEPTED_TYPES
        .iter()
        .find(|(accepted, _)| *accepted == ext)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| ImageError::UnsupportedType(path.display().to_string()))
}

/// Read an image file from disk into an upload.
///
/// # Errors
///
/// Returns [`ImageError`] if the type is not accepted or the file cannot be read.
pub async fn load_upload(path: &Path) -> Result<ImageUpload, ImageError> {
    let mime = mime_for(path)?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ImageError::Read { path: path.to_path_buf(), source })?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("imagen")
        .to_owned();
    Ok(ImageUpload { file_name, mime, bytes })
}

// =============================================================================
// PREVIEWS
// =============================================================================

/// Counts live previews so leaks are observable.
#[derive(Clone, Debug, Default)]
pub struct PreviewTracker {
    live: Arc<AtomicUsize>,
}

impl PreviewTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a preview for `label`; it stays live until the handle drops.
    #[must_use]
    pub fn open(&self, label: &str) -> PreviewHandle {
        self.live.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(label, "image preview opened");
        PreviewHandle { label: label.to_owned(), live: Arc::clone(&self.live) }
    }

    /// Number of previews not yet released.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// A transient local preview. Released on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    label: String,
    live: Arc<AtomicUsize>,
}

impl PreviewHandle {
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!(label = %self.label, "image preview released");
    }
}

/// An image staged on the product form together with its preview.
#[derive(Debug)]
pub struct ImageAttachment {
    pub upload: ImageUpload,
    preview: PreviewHandle,
}

impl ImageAttachment {
    #[must_use]
    pub fn new(upload: ImageUpload, tracker: &PreviewTracker) -> Self {
        let preview = tracker.open(&upload.file_name);
        Self { upload, preview }
    }

    /// One-line description shown in the preview zone.
    #[must_use]
    pub fn describe(&self) -> String {
        #[allow(clippy::cast_precision_loss)]
        let kib = self.upload.bytes.len() as f64 / 1024.0;
        format!("{} ({kib:.1} KiB, {})", self.preview.label(), self.upload.mime)
    }
}
