//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! Everything lives under ~/.imagegen/ except downloads.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the imagegen directory (~/.imagegen/)
pub fn imagegen_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".imagegen"))
}

/// Get the config file path (~/.imagegen/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(imagegen_dir()?.join("config.json"))
}

/// Get the default database file path (~/.imagegen/images.db)
pub fn default_database_path() -> AppResult<PathBuf> {
    Ok(imagegen_dir()?.join("images.db"))
}

/// Get the default directory for saved images.
///
/// Falls back to ~/.imagegen/downloads when the platform has no downloads dir.
pub fn default_download_dir() -> AppResult<PathBuf> {
    match dirs::download_dir() {
        Some(dir) => Ok(dir),
        None => Ok(imagegen_dir()?.join("downloads")),
    }
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the imagegen directory, creating if it doesn't exist
pub fn ensure_imagegen_dir() -> AppResult<PathBuf> {
    let path = imagegen_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
