use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::config::StorageConfig;

/// URL prefix under which uploaded images are served
pub const IMAGE_URL_PREFIX: &str = "/uploads/images";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes uploaded images to the local upload directory
#[derive(Debug, Clone)]
pub struct StorageService {
    images_dir: PathBuf,
    max_bytes: usize,
}

impl StorageService {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            images_dir: Path::new(&config.upload_dir).join("images"),
            max_bytes: config.max_upload_bytes,
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Store `bytes` under a generated name and return its public URL
    pub async fn write_image(&self, bytes: &[u8], content_type: &str) -> Result<String, StorageError> {
        let filename = format!("{}.{}", Uuid::new_v4().simple(), extension_for(content_type));
        let path = self.images_dir.join(&filename);

        tokio::fs::create_dir_all(&self.images_dir)
            .await
            .map_err(|source| StorageError::Write {
                path: self.images_dir.clone(),
                source,
            })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::Write { path, source })?;

        tracing::debug!("stored image {} ({} bytes)", filename, bytes.len());
        Ok(format!("{}/{}", IMAGE_URL_PREFIX, filename))
    }

    /// File behind a URL returned by `write_image`
    pub fn path_for(&self, url: &str) -> Option<PathBuf> {
        let filename = url.strip_prefix(IMAGE_URL_PREFIX)?.strip_prefix('/')?;
        if filename.is_empty() || filename.contains(['/', '\\']) || filename.starts_with('.') {
            return None;
        }
        Some(self.images_dir.join(filename))
    }

    /// Delete a stored image; failures are logged, never returned
    pub async fn remove_image(&self, url: &str) {
        let Some(path) = self.path_for(url) else {
            tracing::warn!("not removing image outside the upload directory: {}", url);
            return;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!("removed image {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("failed to remove image {}: {}", path.display(), e),
        }
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/apng" => "apng",
        "image/avif" => "avif",
        "image/gif" => "gif",
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    }
}
