//! Device Save
//!
//! Writes a remote image to local storage. The recent-creations manager
//! only decides the filename; a `DeviceSaver` does the actual transfer.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::default_download_dir;

/// Filename used when the URL has no usable final path segment
pub const FALLBACK_FILENAME: &str = "image.png";

/// Derive a download filename from the URL's final path segment.
///
/// Query strings and fragments are ignored.
pub fn filename_from_url(raw: &str) -> String {
    let segment = match Url::parse(raw) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.last().map(str::to_string)),
        Err(_) => raw
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    };

    match segment {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name,
        _ => FALLBACK_FILENAME.to_string(),
    }
}

/// Device-level save capability
#[async_trait]
pub trait DeviceSaver: Send + Sync {
    /// Save the resource at `url` as `filename`, in `dir` or the saver's
    /// default location. Returns the written path.
    async fn save(&self, url: &str, filename: &str, dir: Option<&Path>) -> AppResult<PathBuf>;
}

/// Saver that fetches over HTTP and writes into a directory
#[derive(Debug, Clone)]
pub struct FileSaver {
    client: reqwest::Client,
    default_dir: PathBuf,
}

impl FileSaver {
    pub fn new(client: reqwest::Client, default_dir: PathBuf) -> Self {
        Self {
            client,
            default_dir,
        }
    }

    /// Saver writing into the configured directory, or the platform
    /// downloads directory when none is configured
    pub fn from_config(client: reqwest::Client, download_dir: Option<&str>) -> AppResult<Self> {
        let dir = match download_dir {
            Some(dir) => PathBuf::from(dir),
            None => default_download_dir()?,
        };
        Ok(Self::new(client, dir))
    }

    pub fn default_dir(&self) -> &Path {
        &self.default_dir
    }
}

#[async_trait]
impl DeviceSaver for FileSaver {
    async fn save(&self, url: &str, filename: &str, dir: Option<&Path>) -> AppResult<PathBuf> {
        let dir = dir.unwrap_or(&self.default_dir);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Failed to fetch {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(AppError::internal(format!(
                "Failed to fetch {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::internal(format!("Failed to read {}: {}", url, e)))?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(filename);
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!("saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}
