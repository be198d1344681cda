//! JSON Configuration Management
//!
//! Handles reading and writing the application configuration file and the
//! one-time environment overrides applied on load. A credential written in
//! the file survives saves; one taken from the environment is never saved.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_imagegen_dir};

/// Environment variable holding the generation API credential
pub const ENV_CREDENTIAL: &str = "OPENAI_API_KEY";
/// Environment variable overriding the backend base URL
pub const ENV_SERVER_URL: &str = "IMAGEGEN_SERVER_URL";
/// Environment variable overriding the backend bind address
pub const ENV_BIND: &str = "IMAGEGEN_BIND";
/// Environment variable overriding the database path
pub const ENV_DATABASE: &str = "IMAGEGEN_DATABASE";

/// Configuration service for managing app settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: AppConfig,
    /// Credential as stored on disk
    stored_credential: Option<String>,
}

impl ConfigService {
    /// Create a new config service from ~/.imagegen/config.json, creating
    /// defaults on first run, then apply environment overrides.
    pub fn new() -> AppResult<Self> {
        let mut service = Self::open_default()?;
        service.apply_overrides(|key| std::env::var(key).ok());
        service.config.validate().map_err(AppError::validation)?;
        Ok(service)
    }

    /// Open ~/.imagegen/config.json without environment overrides
    pub fn open_default() -> AppResult<Self> {
        ensure_imagegen_dir()?;
        Self::open(config_path()?)
    }

    /// Open a config file at an explicit path, creating it with defaults if
    /// it does not exist. No environment overrides are applied.
    pub fn open(config_path: PathBuf) -> AppResult<Self> {
        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let default_config = AppConfig::default();
            Self::save_to_file(&config_path, &default_config, None)?;
            default_config
        };

        Ok(Self {
            config_path,
            stored_credential: config.service.credential.clone(),
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<AppConfig> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting. The serialized
    /// config never carries a credential; `credential` is written explicitly.
    fn save_to_file(path: &Path, config: &AppConfig, credential: Option<&str>) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        let mut value = serde_json::to_value(config)?;
        if let (Some(credential), Some(service)) = (
            credential,
            value.get_mut("service").and_then(Value::as_object_mut),
        ) {
            service.insert("credential".to_string(), Value::from(credential));
        }
        let content = serde_json::to_string_pretty(&value)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from an environment lookup. Overrides live in memory
    /// only; `save` keeps the stored credential rather than the override.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(credential) = non_empty(ENV_CREDENTIAL) {
            self.config.service.credential = Some(credential);
        }
        if let Some(url) = non_empty(ENV_SERVER_URL) {
            tracing::debug!("server base URL overridden from {}", ENV_SERVER_URL);
            self.config.service.server_base_url = url;
        }
        if let Some(bind) = non_empty(ENV_BIND) {
            self.config.bind_address = bind;
        }
        if let Some(path) = non_empty(ENV_DATABASE) {
            self.config.database_path = Some(path);
        }
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a clone of the current configuration
    pub fn get_config_clone(&self) -> AppConfig {
        self.config.clone()
    }

    /// Update the configuration with a partial update and save it. An
    /// invalid result is rejected and leaves the configuration unchanged.
    pub fn update_config(&mut self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let credential = update.credential.clone();
        let mut updated = self.config.clone();
        updated.apply_update(update);
        updated.validate().map_err(AppError::validation)?;

        self.config = updated;
        if credential.is_some() {
            self.stored_credential = credential;
        }
        self.save()?;
        Ok(self.config.clone())
    }

    /// Save the current configuration to disk
    pub fn save(&self) -> AppResult<()> {
        Self::save_to_file(
            &self.config_path,
            &self.config,
            self.stored_credential.as_deref(),
        )
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}
