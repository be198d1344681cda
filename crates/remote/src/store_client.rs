//! Backend Image Store Client
//!
//! `ImageStore` implementation that talks to the imagegen backend over HTTP
//! (`/api/images`, `/api/posts`).

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::http_client::transport_error;
use crate::status::parse_http_error;
use imagegen_core::config::ServiceConfig;
use imagegen_core::error::{RemoteError, RemoteResult};
use imagegen_core::models::{
    DeleteImageRequest, DeleteImageResponse, GeneratedImage, NewRecord, Post, PostsEnvelope,
};
use imagegen_core::remote::ImageStore;

const IMAGES_PATH: &str = "api/images";
const POSTS_PATH: &str = "api/posts";

/// HTTP client for the image/post backend
#[derive(Debug, Clone)]
pub struct HttpImageStore {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpImageStore {
    /// Create a new store client rooted at `config.server_base_url`
    pub fn new(config: &ServiceConfig, client: reqwest::Client) -> RemoteResult<Self> {
        let mut base_url = Url::parse(&config.server_base_url).map_err(|e| {
            RemoteError::network(format!(
                "invalid server base URL {}: {}",
                config.server_base_url, e
            ))
        })?;
        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, client })
    }

    /// Resolve a backend path against the base URL
    fn endpoint(&self, path: &str) -> RemoteResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RemoteError::network(format!("invalid endpoint {}: {}", path, e)))
    }

    /// Send a request and decode a JSON success body
    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&impl serde::Serialize>,
    ) -> RemoteResult<T> {
        tracing::debug!(%method, %url, "backend request");
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(parse_http_error(status.as_u16(), &text, "backend"));
        }

        serde_json::from_str(&text)
            .map_err(|e| RemoteError::malformed(format!("unexpected backend response: {}", e)))
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn save_image(&self, record: &NewRecord) -> RemoteResult<GeneratedImage> {
        let url = self.endpoint(IMAGES_PATH)?;
        let mut image: GeneratedImage = self.send_json(Method::POST, url, Some(record)).await?;
        image.persisted = true;
        Ok(image)
    }

    async fn list_images(&self) -> RemoteResult<Vec<GeneratedImage>> {
        let url = self.endpoint(IMAGES_PATH)?;
        let mut images: Vec<GeneratedImage> =
            self.send_json(Method::GET, url, None::<&()>).await?;
        for image in &mut images {
            image.persisted = true;
        }
        Ok(images)
    }

    async fn delete_image(&self, image_url: &str) -> RemoteResult<usize> {
        let url = self.endpoint(IMAGES_PATH)?;
        let body = DeleteImageRequest {
            url: image_url.to_string(),
        };
        let response: DeleteImageResponse =
            self.send_json(Method::DELETE, url, Some(&body)).await?;
        Ok(response.deleted)
    }

    async fn find_image(&self, id: &str) -> RemoteResult<Option<GeneratedImage>> {
        let url = self.endpoint(&format!("{}/{}", IMAGES_PATH, id))?;
        match self
            .send_json::<GeneratedImage>(Method::GET, url, None::<&()>)
            .await
        {
            Ok(mut image) => {
                image.persisted = true;
                Ok(Some(image))
            }
            Err(RemoteError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn create_post(&self, record: &NewRecord) -> RemoteResult<Post> {
        let url = self.endpoint(POSTS_PATH)?;
        self.send_json(Method::POST, url, Some(record)).await
    }

    async fn list_posts(&self) -> RemoteResult<Vec<Post>> {
        let url = self.endpoint(POSTS_PATH)?;
        let envelope: PostsEnvelope = self.send_json(Method::GET, url, None::<&()>).await?;
        Ok(envelope.data)
    }
}
