//! Data Model
//!
//! Records exchanged between the client controllers, the backend and the
//! document store. `GeneratedImage` and `Post` share a shape but have
//! separate lifecycles: images are local drafts that get persisted
//! best-effort, posts are explicit publications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An image produced by a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub prompt: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Whether the durable save of this image has succeeded. Local only.
    #[serde(skip)]
    pub persisted: bool,
}

impl GeneratedImage {
    /// Create a fresh, not yet persisted image for `url`.
    pub fn new(prompt: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: None,
            name: None,
            prompt: prompt.into(),
            url: url.into(),
            created_at: None,
            persisted: false,
        }
    }

    /// The create-call body for this image.
    pub fn to_new_record(&self) -> NewRecord {
        NewRecord {
            name: self.name.clone(),
            prompt: self.prompt.clone(),
            url: self.url.clone(),
        }
    }
}

/// A published creation shown on the community feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub prompt: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn new(name: Option<String>, prompt: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: None,
            name,
            prompt: prompt.into(),
            url: url.into(),
            created_at: None,
        }
    }

    /// Case-insensitive substring match against name or prompt.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(needle))
            || self.prompt.to_lowercase().contains(needle)
    }
}

/// Body of a create call (`POST /api/images`, `POST /api/posts`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub url: String,
}

impl NewRecord {
    /// Required-field check shared by client and server.
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt.trim().is_empty() {
            return Err("prompt is required".to_string());
        }
        if self.url.trim().is_empty() {
            return Err("url is required".to_string());
        }
        Ok(())
    }

    /// Blank names are stored as absent.
    pub fn normalized_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }
}

/// Body of `DELETE /api/images`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteImageRequest {
    #[serde(default)]
    pub url: String,
}

/// Confirmation returned by `DELETE /api/images`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteImageResponse {
    pub url: String,
    pub deleted: usize,
}

/// Listing envelope returned by `GET /api/posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostsEnvelope {
    pub data: Vec<Post>,
}

/// Error body returned by the backend on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
