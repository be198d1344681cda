//! Core Error Types
//!
//! Defines the error taxonomy shared by the imagegen workspace. These types
//! only depend on thiserror + std so that the remote clients and the
//! application crate can agree on them without pulling each other in.
//!
//! The application crate adds storage and server variants on top (see
//! `imagegen::utils::error::AppError`).

use thiserror::Error;

/// Failure of a call to a remote collaborator (generation API or image store).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced a response (offline, DNS, reset, timeout)
    #[error("Network error: {message}")]
    Network { message: String },

    /// The remote answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Credential missing or rejected
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The response body did not have the expected shape
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    /// The caller cancelled before the result was applied
    #[error("Request cancelled")]
    Cancelled,
}

/// Result type alias for remote calls
pub type RemoteResult<T> = Result<T, RemoteError>;

impl RemoteError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
        }
    }

    /// Create a malformed payload error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: msg.into(),
        }
    }

    /// Create an authentication error
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication {
            message: msg.into(),
        }
    }

    /// Whether the failure happened below HTTP (no response at all)
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

/// User-facing classification of every failure the workflow can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caught locally before any remote call
    Validation,
    /// Generation call failed, returned non-2xx or a malformed payload
    RemoteService,
    /// An individual save/delete call failed
    Persistence,
    /// Generic fetch failure such as being offline
    Network,
}

/// Errors returned by `GenerationController::generate`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Please enter a prompt")]
    EmptyPrompt,

    #[error("Error generating image: {0}")]
    Service(#[source] RemoteError),

    #[error("Generation cancelled")]
    Cancelled,
}

impl GenerationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyPrompt | Self::Cancelled => ErrorCategory::Validation,
            Self::Service(e) if e.is_network() => ErrorCategory::Network,
            Self::Service(_) => ErrorCategory::RemoteService,
        }
    }
}

impl From<RemoteError> for GenerationError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Cancelled => Self::Cancelled,
            other => Self::Service(other),
        }
    }
}

/// Errors returned by `GenerationController::submit`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Please generate an image with valid details")]
    IncompleteSubmission,

    #[error("Submission cancelled")]
    Cancelled,
}

impl SubmitError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }
}

/// Which persistence verb failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOp {
    SaveImage,
    DeleteImage,
    CreatePost,
}

impl std::fmt::Display for PersistOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistOp::SaveImage => write!(f, "save image"),
            PersistOp::DeleteImage => write!(f, "delete image"),
            PersistOp::CreatePost => write!(f, "create post"),
        }
    }
}

/// A single save/delete call that failed. Never affects sibling calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to {op} {url}: {source}")]
pub struct PersistenceError {
    pub op: PersistOp,
    pub url: String,
    #[source]
    pub source: RemoteError,
}

impl PersistenceError {
    pub fn new(op: PersistOp, url: impl Into<String>, source: RemoteError) -> Self {
        Self {
            op,
            url: url.into(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        if self.source.is_network() {
            ErrorCategory::Network
        } else {
            ErrorCategory::Persistence
        }
    }
}

/// Speech capability failures. The voice adapter swallows these (start is a
/// silent no-op) but recognizers still report them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    #[error("Speech recognition is not available on this platform")]
    Unavailable,

    #[error("Speech recognition failed: {0}")]
    Failed(String),
}
