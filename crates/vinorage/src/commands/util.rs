//! Shared helpers for command handlers.

use std::sync::Arc;

use vinorage_api::TransportConfig;
use vinorage_core::{ConfigEntry, CoreError, Entity, LoadedEntry, Platform};

use crate::error::CliError;

/// Load an entry with its own HTTP client. Fails if the controller does
/// not answer the first refresh.
pub async fn load(entry: ConfigEntry) -> Result<LoadedEntry, CliError> {
    let http = TransportConfig::default()
        .with_timeout(entry.config.timeout)
        .build_client()
        .map_err(CoreError::from)?;
    Ok(LoadedEntry::load(entry, http).await?)
}

/// Load an entry for a single command: no poll ticker.
pub async fn load_once(mut entry: ConfigEntry) -> Result<LoadedEntry, CliError> {
    entry.config = entry.config.with_poll_interval_secs(0);
    load(entry).await
}

/// The entity for `platform`; every loaded entry has one of each.
pub fn entity(loaded: &LoadedEntry, platform: Platform) -> Result<&Arc<dyn Entity>, CliError> {
    loaded.entity(platform).ok_or_else(|| CliError::Internal {
        message: format!("entry '{}' has no {platform:?} entity", loaded.entry().entry_id),
    })
}
