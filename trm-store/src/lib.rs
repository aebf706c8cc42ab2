// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # TRM Store
//!
//! Configuration loading and persistence for TRM.
//!
//! This crate provides:
//!
//! - **RulesStore**: The validated rule table, shared as `Arc<RuleTable>`
//! - **SettingsStore**: User preferences with persistence
//! - **Persistence**: File I/O helpers for JSON and YAML
//!
//! ## Usage
//!
//! ```ignore
//! use trm_store::{RulesStore, SettingsStore};
//!
//! let settings = SettingsStore::load_default().await;
//! let rules = RulesStore::load(None, &settings.get().await).await?;
//!
//! let quote = trm_engine::compute_quote(&input, &rules.rules())?;
//! ```

pub mod error;
pub mod persistence;
pub mod rules_store;
pub mod settings_store;

pub use error::StoreError;
pub use persistence::{
    FileFormat, default_config_dir, default_rules_path, default_settings_path, load_file,
    load_json, load_json_or_default, save_file, save_json,
};
pub use rules_store::{RulesSource, RulesStore, load_rules_file};
pub use settings_store::{LogLevel, Settings, SettingsStore};
