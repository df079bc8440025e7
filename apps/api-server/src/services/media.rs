//! Media file storage.
//!
//! Uploaded files (profile pictures, playlist covers) live under a
//! configurable media root, addressed by relative paths stored on the
//! owning row. Writes are synchronous and not transactional with the row
//! update; a failed delete of a replaced file only logs a warning.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Stores and removes uploaded media files.
#[derive(Debug, Clone)]
pub struct MediaService {
    root: PathBuf,
}

impl MediaService {
    /// Creates a service rooted at the given directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Saves `data` under `category`, named after `owner_id` with the
    /// extension of the uploaded filename. Returns the relative path to
    /// store on the owning row.
    pub async fn save(
        &self,
        category: &str,
        owner_id: Uuid,
        original_filename: &str,
        data: &[u8],
    ) -> std::io::Result<String> {
        let ext = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let relative = format!("{category}/{owner_id}.{ext}");
        let path = self.root.join(&relative);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;

        tracing::debug!(path = %path.display(), "Media file saved");
        Ok(relative)
    }

    /// Removes a previously saved file. Best-effort: failures are logged,
    /// not propagated.
    pub async fn remove(&self, relative: &str) {
        let path = self.root.join(relative);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove media file");
        }
    }
}
