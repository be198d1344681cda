//! Settings Models
//!
//! Application configuration and settings data structures.

use serde::{Deserialize, Serialize};

use imagegen_core::config::ServiceConfig;

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation API and backend endpoints
    #[serde(default)]
    pub service: ServiceConfig,
    /// Address the backend listens on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// SQLite file backing the backend; default under ~/.imagegen/
    #[serde(default)]
    pub database_path: Option<String>,
    /// Images requested per generation call
    #[serde(default = "default_generation_count")]
    pub generation_count: u32,
    /// Requested image size, e.g. "1024x1024"
    #[serde(default = "default_image_size")]
    pub image_size: String,
    /// Debounce window for feed search, in milliseconds
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    /// Pre-fill the prompt draft with the committed prompt when editing starts
    #[serde(default)]
    pub prefill_on_edit: bool,
    /// Where saved images are written; default is the platform downloads dir
    #[serde(default)]
    pub download_dir: Option<String>,
    /// Per-request timeout for remote calls, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_generation_count() -> u32 {
    4
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Sizes accepted by the generation API
const SUPPORTED_SIZES: &[&str] = &["256x256", "512x512", "1024x1024", "1792x1024", "1024x1792"];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            bind_address: default_bind_address(),
            database_path: None,
            generation_count: default_generation_count(),
            image_size: default_image_size(),
            search_debounce_ms: default_search_debounce_ms(),
            prefill_on_edit: false,
            download_dir: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub service_endpoint: Option<String>,
    pub credential: Option<String>,
    pub server_base_url: Option<String>,
    pub bind_address: Option<String>,
    pub database_path: Option<String>,
    pub generation_count: Option<u32>,
    pub image_size: Option<String>,
    pub search_debounce_ms: Option<u64>,
    pub prefill_on_edit: Option<bool>,
    pub download_dir: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl SettingsUpdate {
    /// Whether the update changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(endpoint) = update.service_endpoint {
            self.service.service_endpoint = endpoint;
        }
        if let Some(credential) = update.credential {
            self.service.credential = Some(credential);
        }
        if let Some(base_url) = update.server_base_url {
            self.service.server_base_url = base_url;
        }
        if let Some(bind) = update.bind_address {
            self.bind_address = bind;
        }
        if let Some(path) = update.database_path {
            self.database_path = Some(path);
        }
        if let Some(count) = update.generation_count {
            self.generation_count = count;
        }
        if let Some(size) = update.image_size {
            self.image_size = size;
        }
        if let Some(debounce) = update.search_debounce_ms {
            self.search_debounce_ms = debounce;
        }
        if let Some(prefill) = update.prefill_on_edit {
            self.prefill_on_edit = prefill;
        }
        if let Some(dir) = update.download_dir {
            self.download_dir = Some(dir);
        }
        if let Some(timeout) = update.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.service.validate()?;

        // The generation API accepts 1..=10 images per call
        if !(1..=10).contains(&self.generation_count) {
            return Err(format!(
                "generation_count must be between 1 and 10, got {}",
                self.generation_count
            ));
        }

        if !SUPPORTED_SIZES.contains(&self.image_size.as_str()) {
            return Err(format!(
                "Invalid image_size: {}. Must be one of {}",
                self.image_size,
                SUPPORTED_SIZES.join(", ")
            ));
        }

        if self.search_debounce_ms > 10_000 {
            return Err("search_debounce_ms cannot exceed 10000".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be at least 1".to_string());
        }

        if self.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!("Invalid bind_address: {}", self.bind_address));
        }

        Ok(())
    }
}
