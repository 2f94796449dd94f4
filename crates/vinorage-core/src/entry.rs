// ── Entry lifecycle ──
//
// A `ConfigEntry` is one configured controller. Loading it builds the device
// client and coordinator, performs the first refresh and creates the
// entities; unloading cancels the ticker.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::CoordinatorConfig;
use crate::coordinator::Coordinator;
use crate::entity::{Entity, Platform, entities_for};
use crate::error::CoreError;

/// Host identity used for deduplication: trimmed and lowercased.
pub fn normalize_host(host: &str) -> String {
    host.trim().to_ascii_lowercase()
}

/// A configured (but not necessarily loaded) controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    /// Unique id, derived from the normalized host.
    pub entry_id: String,
    pub title: String,
    pub config: CoordinatorConfig,
}

impl ConfigEntry {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            entry_id: normalize_host(&config.host),
            title: format!("Vinorage ({})", config.host),
            config,
        }
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }
}

/// A running entry: coordinator plus its entities.
pub struct LoadedEntry {
    entry: ConfigEntry,
    coordinator: Coordinator,
    entities: Vec<Arc<dyn Entity>>,
}

impl LoadedEntry {
    /// Load an entry using the host-owned `http` client.
    ///
    /// Fails with the first refresh's error, in which case nothing keeps
    /// running.
    pub async fn load(entry: ConfigEntry, http: reqwest::Client) -> Result<Self, CoreError> {
        let coordinator = Coordinator::with_http(entry.config.clone(), http)?;

        if let Err(e) = coordinator.setup().await {
            warn!(entry = %entry.entry_id, error = %e, "entry setup failed");
            coordinator.shutdown().await;
            return Err(e);
        }

        let entities = entities_for(&entry.entry_id, &coordinator);
        info!(entry = %entry.entry_id, title = %entry.title, "entry loaded");

        Ok(Self {
            entry,
            coordinator,
            entities,
        })
    }

    /// Stop polling and hand back the entry so it can be loaded again.
    pub async fn unload(self) -> ConfigEntry {
        self.coordinator.shutdown().await;
        info!(entry = %self.entry.entry_id, "entry unloaded");
        self.entry
    }

    /// Unload, then load the same entry with a fresh coordinator.
    pub async fn reload(self, http: reqwest::Client) -> Result<Self, CoreError> {
        let entry = self.unload().await;
        Self::load(entry, http).await
    }

    pub fn entry(&self) -> &ConfigEntry {
        &self.entry
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn entities(&self) -> &[Arc<dyn Entity>] {
        &self.entities
    }

    /// The entity for `platform`. Every loaded entry has exactly one of each.
    pub fn entity(&self, platform: Platform) -> Option<&Arc<dyn Entity>> {
        self.entities
            .iter()
            .find(|e| e.descriptor().platform == platform)
    }
}
