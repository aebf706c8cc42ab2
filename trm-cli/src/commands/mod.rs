//! CLI command implementations.

pub mod config;
pub mod credits;
pub mod quote;
pub mod rules;
pub mod summary;

use anyhow::Result;
use trm_store::{RulesStore, SettingsStore};

use crate::Cli;

/// Loads the rule table for this invocation (`--rules` wins over settings).
pub async fn load_rules(cli: &Cli, settings: &SettingsStore) -> Result<RulesStore> {
    let settings = settings.get().await;
    Ok(RulesStore::load(cli.rules.as_deref(), &settings).await?)
}

