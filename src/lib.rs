//! Imagegen - Prompt-to-Image Application
//!
//! This library provides everything behind the `imagegen` binary:
//! - Backend HTTP routes over a SQLite document store
//! - Client-side controllers (generation workflow, recent creations,
//!   listing/search, voice capture, prompt editing)
//! - Storage layer (SQLite, JSON config)
//! - Data models and utilities

pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

// Re-export models (avoiding settings module conflict)
pub use models::response::*;
pub use models::settings::{AppConfig, SettingsUpdate};
pub use routes::{router, serve};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
