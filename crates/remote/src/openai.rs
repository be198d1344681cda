//! OpenAI Image Generation
//!
//! Implementation of the `GenerationService` trait for OpenAI's images API
//! (`POST /v1/images/generations`).

use async_trait::async_trait;
use serde::Deserialize;

use crate::http_client::transport_error;
use crate::status::{missing_credential_error, parse_http_error};
use imagegen_core::config::ServiceConfig;
use imagegen_core::error::{RemoteError, RemoteResult};
use imagegen_core::remote::{GenerationRequest, GenerationService};

/// OpenAI image generation client
pub struct OpenAIImageService {
    endpoint: String,
    credential: Option<String>,
    client: reqwest::Client,
}

impl OpenAIImageService {
    /// Create a new client from the injected service configuration
    pub fn new(config: &ServiceConfig, client: reqwest::Client) -> Self {
        Self {
            endpoint: config.service_endpoint.clone(),
            credential: config.credential.clone(),
            client,
        }
    }

    /// Build the request body for the API
    fn build_request_body(&self, request: &GenerationRequest) -> serde_json::Value {
        serde_json::json!({
            "prompt": request.prompt,
            "n": request.count,
            "size": request.size,
        })
    }

    /// Parse the images response body into URLs.
    ///
    /// Anything other than a non-empty `data` array whose entries all carry a
    /// `url` is rejected.
    pub fn parse_response(body: &str) -> RemoteResult<Vec<String>> {
        let response: ImagesResponse = serde_json::from_str(body)
            .map_err(|e| RemoteError::malformed(format!("Failed to parse response: {}", e)))?;

        let data = response
            .data
            .ok_or_else(|| RemoteError::malformed("response has no data array"))?;
        if data.is_empty() {
            return Err(RemoteError::malformed("response contains no images"));
        }

        data.into_iter()
            .enumerate()
            .map(|(i, datum)| {
                datum
                    .url
                    .filter(|u| !u.is_empty())
                    .ok_or_else(|| RemoteError::malformed(format!("image {} has no url", i)))
            })
            .collect()
    }
}

#[async_trait]
impl GenerationService for OpenAIImageService {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, request: &GenerationRequest) -> RemoteResult<Vec<String>> {
        let credential = self
            .credential
            .as_ref()
            .ok_or_else(|| missing_credential_error("openai"))?;

        let body = self.build_request_body(request);
        tracing::debug!(count = request.count, size = %request.size, "requesting images");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", credential))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body_text = response.text().await.map_err(transport_error)?;

        if !(200..300).contains(&status) {
            return Err(parse_http_error(status, &body_text, "openai"));
        }

        Self::parse_response(&body_text)
    }
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Option<Vec<ImageDatum>>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: Option<String>,
}
