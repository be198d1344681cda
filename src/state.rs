//! Application State
//!
//! Shared state handed to every backend route handler.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::settings::AppConfig;
use crate::storage::Database;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::default_database_path;

/// Backend state shared across axum handlers
#[derive(Clone)]
pub struct AppState {
    /// SQLite document store with connection pool
    database: Arc<RwLock<Option<Database>>>,
}

impl AppState {
    /// Create a new uninitialized app state
    pub fn new() -> Self {
        Self {
            database: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a state around an already opened store
    pub fn with_store(db: Database) -> Self {
        Self {
            database: Arc::new(RwLock::new(Some(db))),
        }
    }

    /// Open the document store named by the configuration
    pub async fn initialize(&self, config: &AppConfig) -> AppResult<()> {
        let mut guard = self.database.write().await;
        if guard.is_some() {
            return Ok(());
        }

        let path = match &config.database_path {
            Some(path) => PathBuf::from(path),
            None => default_database_path()?,
        };
        *guard = Some(Database::open(&path)?);
        Ok(())
    }

    /// Check if database is healthy
    pub fn is_database_healthy(&self) -> bool {
        // Use try_read to avoid blocking
        if let Ok(guard) = self.database.try_read() {
            if let Some(ref db) = *guard {
                return db.is_healthy();
            }
        }
        false
    }

    /// Get database access for direct queries
    pub async fn with_database<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Database) -> AppResult<T>,
    {
        let guard = self.database.read().await;
        match &*guard {
            Some(db) => f(db),
            None => Err(AppError::database("Database not initialized")),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("database_healthy", &self.is_database_healthy())
            .finish()
    }
}
