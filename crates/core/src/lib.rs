//! Imagegen Core
//!
//! Foundational data model, error taxonomy and collaborator traits for the
//! imagegen workspace. This crate has no HTTP client, no storage engine and
//! no knowledge of the backend server.
//!
//! ## Module Organization
//!
//! - `error` - Remote, workflow and speech error types plus `ErrorCategory`
//! - `models` - `GeneratedImage`, `Post` and the wire bodies around them
//! - `remote` - `GenerationService` and `ImageStore` traits
//! - `speech` - `SpeechRecognizer` and recognition sessions
//! - `config` - Injected `ServiceConfig`
//! - `cancel` - Cancellation-aware remote call helper

pub mod cancel;
pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod speech;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{
    ErrorCategory, GenerationError, PersistOp, PersistenceError, RemoteError, RemoteResult,
    SpeechError, SubmitError,
};

// ── Data Model ─────────────────────────────────────────────────────────
pub use models::{
    DeleteImageRequest, DeleteImageResponse, ErrorBody, GeneratedImage, NewRecord, Post,
    PostsEnvelope,
};

// ── Collaborators ──────────────────────────────────────────────────────
pub use remote::{GenerationRequest, GenerationService, ImageStore};
pub use speech::{RecognitionSession, SessionPoll, SpeechRecognizer, TranscriptSender};

// ── Configuration ──────────────────────────────────────────────────────
pub use config::ServiceConfig;

pub use cancel::run_cancellable;
