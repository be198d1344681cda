//! Service Configuration
//!
//! Endpoint and credential data injected into the remote clients at
//! construction time. Nothing downstream reads the process environment;
//! the application's config layer resolves overrides once and hands the
//! result over.

use serde::{Deserialize, Serialize};

/// Default image generation endpoint
pub const DEFAULT_SERVICE_ENDPOINT: &str = "https://api.openai.com/v1/images/generations";

/// Default backend base URL
pub const DEFAULT_SERVER_BASE_URL: &str = "http://localhost:3000";

/// Connection details for the generation API and the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Full URL of the image generation endpoint
    pub service_endpoint: String,
    /// Bearer credential for the generation endpoint. Not serialized; the
    /// config file layer decides whether to write one back.
    #[serde(default, skip_serializing)]
    pub credential: Option<String>,
    /// Base URL of the image/post backend
    pub server_base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_endpoint: DEFAULT_SERVICE_ENDPOINT.to_string(),
            credential: None,
            server_base_url: DEFAULT_SERVER_BASE_URL.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn new(
        service_endpoint: impl Into<String>,
        credential: Option<String>,
        server_base_url: impl Into<String>,
    ) -> Self {
        Self {
            service_endpoint: service_endpoint.into(),
            credential,
            server_base_url: server_base_url.into(),
        }
    }

    /// Validate that both URLs are absolute http(s) URLs
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("service_endpoint", &self.service_endpoint),
            ("server_base_url", &self.server_base_url),
        ] {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(format!("{} must be an http(s) URL: {}", field, value));
            }
        }
        Ok(())
    }
}
