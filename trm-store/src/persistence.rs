//! File persistence helpers.
//!
//! Loads and saves JSON or YAML files. Writes are atomic and, on Unix,
//! owner-only.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StoreError;

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - macOS: `~/Library/Application Support/TRM`
/// - Linux: `~/.config/trm`
/// - Windows: `%APPDATA%\trm`
pub fn default_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support").join("TRM"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    #[cfg(not(target_os = "macos"))]
    {
        dirs::config_dir()
            .map(|c| c.join("trm"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Returns the default settings file path.
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}

/// Returns the default rule table path (`rules.json`).
pub fn default_rules_path() -> PathBuf {
    default_config_dir().join("rules.json")
}

/// Rule table files looked for in the config directory, in order.
pub fn rules_candidates(dir: &Path) -> Vec<PathBuf> {
    ["rules.json", "rules.yaml", "rules.yml"]
        .iter()
        .map(|name| dir.join(name))
        .collect()
}

// ============================================================================
// File Formats
// ============================================================================

/// On-disk encoding, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// `.json`
    Json,
    /// `.yaml` or `.yml`
    Yaml,
}

impl FileFormat {
    /// Detects the format from a path's extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnsupportedFormat` for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(FileFormat::Json),
            "yaml" | "yml" => Ok(FileFormat::Yaml),
            _ => Err(StoreError::UnsupportedFormat(if ext.is_empty() {
                path.display().to_string()
            } else {
                format!(".{ext}")
            })),
        }
    }

    /// Parses text in this format.
    ///
    /// # Errors
    ///
    /// Returns the underlying parser error.
    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, StoreError> {
        Ok(match self {
            FileFormat::Json => serde_json::from_str(content)?,
            FileFormat::Yaml => serde_yaml::from_str(content)?,
        })
    }

    /// Renders a value in this format.
    ///
    /// # Errors
    ///
    /// Returns the underlying serializer error.
    pub fn render<T: Serialize>(self, data: &T) -> Result<String, StoreError> {
        Ok(match self {
            FileFormat::Json => serde_json::to_string_pretty(data)?,
            FileFormat::Yaml => serde_yaml::to_string(data)?,
        })
    }
}

// ============================================================================
// Security: File Permissions
// ============================================================================

/// Sets owner-only permissions (0o600) on Unix systems.
#[cfg(unix)]
async fn set_restrictive_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = "0600", "Set restrictive permissions");
    Ok(())
}

/// Sets owner-only directory permissions (0o700) on Unix systems.
#[cfg(unix)]
async fn set_restrictive_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o700);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = "0700", "Set restrictive directory permissions");
    Ok(())
}

#[cfg(not(unix))]
async fn set_restrictive_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(not(unix))]
async fn set_restrictive_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// File Operations
// ============================================================================

/// Creates missing parent directories.
///
/// Directories created inside the default config dir are made owner-only.
async fn create_secure_parent_dirs(path: &Path) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent.exists() {
        return Ok(());
    }

    debug!(path = %parent.display(), "Creating directory");
    tokio::fs::create_dir_all(parent).await?;

    let config_dir = default_config_dir();
    let mut current = parent.to_path_buf();
    while current.starts_with(&config_dir) {
        set_restrictive_dir_permissions(&current).await?;
        if !current.pop() {
            break;
        }
    }
    Ok(())
}

/// Saves data to a file, encoded by the path's extension.
///
/// Creates parent directories, writes atomically (temp file + rename),
/// and sets owner-only permissions on Unix.
///
/// # Errors
///
/// Returns an error for unknown extensions, serialization failures, or IO
/// failures.
pub async fn save_file<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let format = FileFormat::from_path(path)?;
    debug!(path = %path.display(), ?format, "Saving file");

    create_secure_parent_dirs(path).await?;
    let content = format.render(data)?;

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);
    tokio::fs::write(&temp_path, &content).await?;
    tokio::fs::rename(&temp_path, path).await?;

    set_restrictive_permissions(path).await?;

    debug!(path = %path.display(), "File saved");
    Ok(())
}

/// Loads data from a file, decoded by the path's extension.
///
/// # Errors
///
/// Returns an error for unknown extensions, missing files, or malformed
/// content.
pub async fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let format = FileFormat::from_path(path)?;
    debug!(path = %path.display(), ?format, "Loading file");

    let content = tokio::fs::read_to_string(path).await?;
    format.parse(&content)
}

/// Saves data as pretty JSON, regardless of extension.
///
/// # Errors
///
/// Returns an error for serialization or IO failures.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    create_secure_parent_dirs(path).await?;
    let json = FileFormat::Json.render(data)?;

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &json).await?;
    tokio::fs::rename(&temp_path, path).await?;
    set_restrictive_permissions(path).await?;

    debug!(path = %path.display(), "JSON file saved");
    Ok(())
}

/// Loads data from a JSON file.
///
/// # Errors
///
/// Returns an error for missing files or malformed JSON.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let content = tokio::fs::read_to_string(path).await?;
    FileFormat::Json.parse(&content)
}

/// Loads data from a JSON file, returning the default when it cannot be read.
///
/// A missing file is silent; a malformed one is logged.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path).await {
        Ok(data) => data,
        Err(e) => {
            if !e.is_not_found() {
                warn!(path = %path.display(), error = %e, "Failed to load, using defaults");
            }
            T::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
