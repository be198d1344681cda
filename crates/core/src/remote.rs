//! Remote Collaborator Traits
//!
//! The generation API and the image store are opaque remote functions to the
//! workflow. Concrete HTTP implementations live in `imagegen-remote`; tests
//! substitute in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RemoteResult;
use crate::models::{GeneratedImage, NewRecord, Post};

/// One generation call: `count` images of `size` for `prompt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub count: u32,
    pub size: String,
}

/// Remote image generation: prompt in, list of image URLs out.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Returns the service name for logging.
    fn name(&self) -> &'static str;

    /// Generate images. Implementations must fail with
    /// `RemoteError::MalformedPayload` rather than return an empty list.
    async fn generate(&self, request: &GenerationRequest) -> RemoteResult<Vec<String>>;
}

/// Durable document store for generated images and published posts.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Insert one generated image record.
    async fn save_image(&self, record: &NewRecord) -> RemoteResult<GeneratedImage>;

    /// List every stored image, newest first.
    async fn list_images(&self) -> RemoteResult<Vec<GeneratedImage>>;

    /// Delete every image record with `url`. Returns how many were removed.
    async fn delete_image(&self, url: &str) -> RemoteResult<usize>;

    /// Look up one image by its store key.
    async fn find_image(&self, id: &str) -> RemoteResult<Option<GeneratedImage>>;

    /// Publish a post.
    async fn create_post(&self, record: &NewRecord) -> RemoteResult<Post>;

    /// List every post in store order.
    async fn list_posts(&self) -> RemoteResult<Vec<Post>>;
}
