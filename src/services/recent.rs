//! Recent Creations
//!
//! Locally known history of generated images, newest first. Generation
//! adds to it, the user deletes from it; deletes are optimistic and never
//! rolled back.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::services::download::{filename_from_url, DeviceSaver};
use imagegen_core::cancel::run_cancellable;
use imagegen_core::error::{PersistOp, PersistenceError, RemoteError, RemoteResult};
use imagegen_core::models::GeneratedImage;
use imagegen_core::remote::ImageStore;

/// Order images newest first; images without a timestamp keep their
/// relative order at the tail
pub(crate) fn sort_newest_first(images: &mut [GeneratedImage]) {
    images.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Manager for the recent-creations sequence
pub struct RecentCreations {
    store: Arc<dyn ImageStore>,
    saver: Arc<dyn DeviceSaver>,
    items: Vec<GeneratedImage>,
}

impl RecentCreations {
    pub fn new(store: Arc<dyn ImageStore>, saver: Arc<dyn DeviceSaver>) -> Self {
        Self {
            store,
            saver,
            items: Vec::new(),
        }
    }

    /// Replace the sequence with the store's full listing
    pub async fn hydrate(&mut self, cancel: &CancellationToken) -> RemoteResult<usize> {
        let mut images = match run_cancellable(cancel, self.store.list_images()).await {
            Ok(images) => images,
            Err(RemoteError::Cancelled) => return Err(RemoteError::Cancelled),
            Err(e) => {
                tracing::warn!("failed to load recent creations: {}", e);
                return Err(e);
            }
        };
        sort_newest_first(&mut images);
        self.items = images;
        tracing::debug!("hydrated {} recent creations", self.items.len());
        Ok(self.items.len())
    }

    /// Add a freshly generated batch. The batch goes in front, keeping its
    /// own order.
    pub fn append(&mut self, images: Vec<GeneratedImage>) {
        self.items.splice(0..0, images);
    }

    pub fn items(&self) -> &[GeneratedImage] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Record a successful durable save: the first unsaved local copy of
    /// `saved.url` takes over its id and timestamp.
    pub fn mark_persisted(&mut self, saved: &GeneratedImage) -> bool {
        match self
            .items
            .iter_mut()
            .find(|image| image.url == saved.url && !image.persisted)
        {
            Some(image) => {
                image.id = saved.id.clone();
                image.created_at = saved.created_at;
                image.persisted = true;
                true
            }
            None => false,
        }
    }

    /// Remove every local record with `url`, then issue one remote delete.
    ///
    /// Returns the number of local records removed. The local removal
    /// stands even when the remote delete fails.
    pub async fn delete(
        &mut self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<usize, PersistenceError> {
        if cancel.is_cancelled() {
            return Err(PersistenceError::new(
                PersistOp::DeleteImage,
                url,
                RemoteError::Cancelled,
            ));
        }

        let before = self.items.len();
        self.items.retain(|image| image.url != url);
        let removed = before - self.items.len();

        match self.store.delete_image(url).await {
            Ok(deleted) => {
                tracing::debug!(url, removed, deleted, "image deleted");
                Ok(removed)
            }
            Err(e) => {
                let err = PersistenceError::new(PersistOp::DeleteImage, url, e);
                tracing::warn!("{}", err);
                Err(err)
            }
        }
    }

    /// Save the image at `url` to the device's default location
    pub async fn save(&self, url: &str) -> String {
        self.save_into(url, None).await
    }

    /// Download the image at `url` into `dir`
    pub async fn download(&self, url: &str, dir: &Path) -> String {
        self.save_into(url, Some(dir)).await
    }

    async fn save_into(&self, url: &str, dir: Option<&Path>) -> String {
        let filename = filename_from_url(url);
        if let Err(e) = self.saver.save(url, &filename, dir).await {
            tracing::warn!("failed to save {} as {}: {}", url, filename, e);
        }
        filename
    }
}

impl std::fmt::Debug for RecentCreations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentCreations")
            .field("items", &self.items.len())
            .finish()
    }
}
