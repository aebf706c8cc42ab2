//! User preferences store.
//!
//! Manages user settings with persistence.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use trm_core::models::DEFAULT_SUCCESS_STATUS;

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json_or_default, save_json};

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Currency used when formatting amounts that carry none of their own.
    pub currency: String,

    /// Status counted as success in summaries.
    pub success_status: String,

    /// Rule table location, overriding the config directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_path: Option<PathBuf>,

    /// Log level used when no CLI flag overrides it.
    pub log_level: LogLevel,

    /// Show large counts as `1.5K` instead of `1,500`.
    pub compact_numbers: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "INR".to_string(),
            success_status: DEFAULT_SUCCESS_STATUS.to_string(),
            rules_path: None,
            log_level: LogLevel::default(),
            compact_numbers: false,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings held in memory and persisted as JSON.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store with default settings, backed by `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
        }
    }

    /// Loads settings from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path.
    ///
    /// A missing file yields defaults; an unreadable one yields defaults
    /// with a warning.
    pub async fn load(path: PathBuf) -> Self {
        debug!(path = %path.display(), "Loading settings");
        let settings = load_json_or_default(&path).await;

        Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
        }
    }

    /// Path the settings are saved to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings in memory.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().await;
        f(&mut settings);
    }

    /// Restores defaults in memory.
    pub async fn reset(&self) {
        self.update(|s| *s = Settings::default()).await;
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    // ========================================================================
    // Convenience Methods
    // ========================================================================

    /// Sets the display currency (stored uppercase).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` unless `code` is three ASCII letters.
    pub async fn set_currency(&self, code: &str) -> Result<(), StoreError> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(StoreError::Config(format!(
                "currency must be a 3-letter ISO code, got {code:?}"
            )));
        }
        let code = code.to_ascii_uppercase();
        self.update(|s| s.currency = code).await;
        Ok(())
    }

    /// Sets the success status used by summaries.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if `status` is blank.
    pub async fn set_success_status(&self, status: &str) -> Result<(), StoreError> {
        let status = status.trim();
        if status.is_empty() {
            return Err(StoreError::Config("success status cannot be empty".into()));
        }
        let status = status.to_lowercase();
        self.update(|s| s.success_status = status).await;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
