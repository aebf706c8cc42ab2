//! Rule table loading.
//!
//! The rule table is read once, validated, and shared as an
//! `Arc<RuleTable>`. Lookup order:
//!
//! 1. An explicit path (e.g., `--rules`)
//! 2. `rulesPath` from the settings
//! 3. `rules.json`, `rules.yaml`, or `rules.yml` in the config directory
//! 4. The bundled canonical table

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use trm_core::RuleTable;

use crate::error::StoreError;
use crate::persistence::{default_config_dir, load_file, rules_candidates, save_file};
use crate::settings_store::Settings;

/// Where the active rule table came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesSource {
    /// Path given by the caller.
    Explicit(PathBuf),
    /// Path configured in the settings.
    Settings(PathBuf),
    /// File found in the config directory.
    ConfigDir(PathBuf),
    /// Built-in canonical table.
    Bundled,
}

impl RulesSource {
    /// The file path, if the table came from disk.
    pub fn path(&self) -> Option<&Path> {
        match self {
            RulesSource::Explicit(p) | RulesSource::Settings(p) | RulesSource::ConfigDir(p) => {
                Some(p)
            }
            RulesSource::Bundled => None,
        }
    }
}

impl std::fmt::Display for RulesSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RulesSource::Explicit(p) | RulesSource::Settings(p) | RulesSource::ConfigDir(p) => {
                write!(f, "{}", p.display())
            }
            RulesSource::Bundled => write!(f, "built-in"),
        }
    }
}

/// The loaded, validated rule table.
#[derive(Debug, Clone)]
pub struct RulesStore {
    rules: Arc<RuleTable>,
    source: RulesSource,
}

impl RulesStore {
    /// Store holding the canonical table.
    pub fn bundled() -> Self {
        Self {
            rules: Arc::new(RuleTable::default()),
            source: RulesSource::Bundled,
        }
    }

    /// Resolves and loads the rule table using the default config directory.
    ///
    /// # Errors
    ///
    /// See [`RulesStore::load_in`].
    pub async fn load(explicit: Option<&Path>, settings: &Settings) -> Result<Self, StoreError> {
        Self::load_in(explicit, settings, &default_config_dir()).await
    }

    /// Resolves and loads the rule table, searching `config_dir` when no
    /// path is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly configured file is missing, or if
    /// the chosen file is malformed or fails validation.
    pub async fn load_in(
        explicit: Option<&Path>,
        settings: &Settings,
        config_dir: &Path,
    ) -> Result<Self, StoreError> {
        let source = if let Some(path) = explicit {
            RulesSource::Explicit(path.to_path_buf())
        } else if let Some(path) = &settings.rules_path {
            RulesSource::Settings(path.clone())
        } else if let Some(path) = rules_candidates(config_dir).into_iter().find(|p| p.exists()) {
            RulesSource::ConfigDir(path)
        } else {
            debug!(dir = %config_dir.display(), "No rule table on disk, using built-in rules");
            return Ok(Self::bundled());
        };

        let Some(path) = source.path() else {
            return Ok(Self::bundled());
        };
        let rules = load_rules_file(path).await?;
        info!(source = %source, "Loaded rule table");

        Ok(Self {
            rules: Arc::new(rules),
            source,
        })
    }

    /// Shared handle to the rule table.
    pub fn rules(&self) -> Arc<RuleTable> {
        Arc::clone(&self.rules)
    }

    /// Where the table came from.
    pub fn source(&self) -> &RulesSource {
        &self.source
    }

    /// Writes the canonical table to `path` in the format of its extension.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the file exists and `force` is false,
    /// or the underlying write error.
    pub async fn init(path: &Path, force: bool) -> Result<(), StoreError> {
        if path.exists() && !force {
            return Err(StoreError::Config(format!(
                "{} already exists",
                path.display()
            )));
        }
        save_file(path, &RuleTable::default()).await?;
        info!(path = %path.display(), "Wrote default rule table");
        Ok(())
    }
}

/// Reads and validates a rule table file.
///
/// # Errors
///
/// Returns an IO, parse, or validation error.
pub async fn load_rules_file(path: &Path) -> Result<RuleTable, StoreError> {
    let rules: RuleTable = load_file(path).await?;
    rules.validate()?;
    debug!(
        path = %path.display(),
        categories = rules.category_rates.len(),
        tiers = rules.volume_tiers.len(),
        promos = rules.promo_codes.len(),
        "Validated rule table"
    );
    Ok(rules)
}

// ============================================================================
// Tests
// ============================================================================
