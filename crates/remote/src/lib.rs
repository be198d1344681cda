//! Imagegen Remote
//!
//! HTTP implementations of the collaborator traits in `imagegen-core`:
//! - OpenAI image generation (`GenerationService`)
//! - The imagegen backend (`ImageStore`)
//!
//! Also includes the HTTP client factory and status-code mapping.

pub mod http_client;
pub mod openai;
pub mod status;
pub mod store_client;

// Re-export main types
pub use http_client::build_http_client;
pub use openai::OpenAIImageService;
pub use status::{missing_credential_error, parse_http_error};
pub use store_client::HttpImageStore;
