//! Shared configuration for the Vinorage CLI.
//!
//! TOML entry profiles, figment loading (defaults, file, environment) and
//! translation to `vinorage_core::CoordinatorConfig`. The CLI adds
//! `GlobalOpts`-aware overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vinorage_core::{
    ConfigEntry, CoordinatorConfig, DEFAULT_SCAN_INTERVAL_SECS, MAX_SCAN_INTERVAL_SECS,
    normalize_host,
};

/// Environment prefix; nested keys are separated by `__`
/// (e.g. `VINORAGE_DEFAULTS__TIMEOUT=5`).
pub const ENV_PREFIX: &str = "VINORAGE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("entry '{name}' not found")]
    EntryNotFound { name: String },

    #[error("no entry selected and no default entry configured")]
    NoEntry,

    #[error("entry '{name}' already exists")]
    DuplicateName { name: String },

    #[error("host '{host}' is already configured as entry '{existing}'")]
    DuplicateHost { host: String, existing: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Entry used when none is selected on the command line.
    pub default_entry: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Configured controllers, by name.
    #[serde(default)]
    pub entries: HashMap<String, EntryProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

/// Accepted values for `defaults.output`.
pub const OUTPUT_FORMATS: &[&str] = &["table", "json", "json-compact", "yaml", "plain"];

/// Accepted values for `defaults.color`.
pub const COLOR_MODES: &[&str] = &["auto", "always", "never"];

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

/// One configured controller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntryProfile {
    /// Controller host or address, optionally with a port.
    pub host: String,

    /// Seconds between polls; 0 disables polling.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,

    /// Override the default timeout.
    pub timeout: Option<u64>,
}

impl EntryProfile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            scan_interval: DEFAULT_SCAN_INTERVAL_SECS,
            timeout: None,
        }
    }

    /// Persistable form of an entry produced by the setup flow.
    pub fn from_entry(entry: &ConfigEntry) -> Self {
        Self {
            host: entry.config.host.clone(),
            scan_interval: entry.config.poll_interval.as_secs(),
            timeout: Some(entry.config.timeout.as_secs()),
        }
    }

    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: format!("entries.{name}.host"),
                reason: "must not be empty".into(),
            });
        }
        if self.scan_interval > MAX_SCAN_INTERVAL_SECS {
            return Err(ConfigError::Validation {
                field: format!("entries.{name}.scan_interval"),
                reason: format!(
                    "must be between 0 and {MAX_SCAN_INTERVAL_SECS}, got {}",
                    self.scan_interval
                ),
            });
        }
        Ok(())
    }
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("expected one of {}, got '{value}'", allowed.join(", ")),
        })
    }
}

// ── Entry management ────────────────────────────────────────────────

impl Config {
    /// Check every entry and the default entry reference.
    pub fn validate(&self) -> Result<(), ConfigError> {
        one_of("defaults.output", &self.defaults.output, OUTPUT_FORMATS)?;
        one_of("defaults.color", &self.defaults.color, COLOR_MODES)?;
        for (name, profile) in &self.entries {
            profile.validate(name)?;
        }
        if let Some(ref name) = self.default_entry {
            if !self.entries.contains_key(name) {
                return Err(ConfigError::Validation {
                    field: "default_entry".into(),
                    reason: format!("entry '{name}' does not exist"),
                });
            }
        }
        Ok(())
    }

    /// Hosts of all configured entries, for deduplication.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|p| p.host.as_str())
    }

    /// Add a new entry. Names and hosts (case-insensitive, trimmed) must be
    /// unique. The first entry becomes the default.
    pub fn add_entry(&mut self, name: &str, profile: EntryProfile) -> Result<(), ConfigError> {
        profile.validate(name)?;

        if self.entries.contains_key(name) {
            return Err(ConfigError::DuplicateName { name: name.into() });
        }

        let identity = normalize_host(&profile.host);
        if let Some((existing, _)) = self
            .entries
            .iter()
            .find(|(_, p)| normalize_host(&p.host) == identity)
        {
            return Err(ConfigError::DuplicateHost {
                host: profile.host,
                existing: existing.clone(),
            });
        }

        self.entries.insert(name.into(), profile);
        if self.default_entry.is_none() {
            self.default_entry = Some(name.into());
        }
        Ok(())
    }

    /// Remove an entry, clearing the default if it pointed at it.
    pub fn remove_entry(&mut self, name: &str) -> Result<EntryProfile, ConfigError> {
        let removed = self
            .entries
            .remove(name)
            .ok_or_else(|| ConfigError::EntryNotFound { name: name.into() })?;
        if self.default_entry.as_deref() == Some(name) {
            self.default_entry = None;
        }
        Ok(removed)
    }

    /// Pick the entry to act on: the explicit name, else the default entry,
    /// else the only entry if exactly one exists.
    pub fn resolve_entry<'a>(
        &'a self,
        name: Option<&'a str>,
    ) -> Result<(&'a str, &'a EntryProfile), ConfigError> {
        let name = match name.or(self.default_entry.as_deref()) {
            Some(name) => name,
            None if self.entries.len() == 1 => {
                return self
                    .entries
                    .iter()
                    .next()
                    .map(|(n, p)| (n.as_str(), p))
                    .ok_or(ConfigError::NoEntry);
            }
            None => return Err(ConfigError::NoEntry),
        };

        self.entries
            .get(name)
            .map(|p| (name, p))
            .ok_or_else(|| ConfigError::EntryNotFound { name: name.into() })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "vinorage", "vinorage").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("vinorage");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `CoordinatorConfig` from a profile, falling back to `defaults`
/// for the timeout.
pub fn profile_to_coordinator_config(
    profile: &EntryProfile,
    defaults: &Defaults,
) -> CoordinatorConfig {
    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    CoordinatorConfig::new(profile.host.trim())
        .with_poll_interval_secs(profile.scan_interval)
        .with_timeout(timeout)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn two_entries() -> Config {
        let mut cfg = Config::default();
        cfg.add_entry("cellar", EntryProfile::new("192.0.2.5")).unwrap();
        cfg.add_entry("garage", EntryProfile::new("cellar-2.local:8080"))
            .unwrap();
        cfg
    }

    #[test]
    fn first_entry_becomes_default() {
        let cfg = two_entries();
        assert_eq!(cfg.default_entry.as_deref(), Some("cellar"));
        assert_eq!(cfg.resolve_entry(None).unwrap().0, "cellar");
        assert_eq!(cfg.resolve_entry(Some("garage")).unwrap().0, "garage");
    }

    #[test]
    fn duplicate_host_is_rejected() {
        let mut cfg = two_entries();
        let err = cfg
            .add_entry("again", EntryProfile::new("  192.0.2.5 "))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateHost { ref existing, .. } if existing == "cellar"));

        let err = cfg
            .add_entry("lift", EntryProfile::new("CELLAR-2.LOCAL:8080"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateHost { .. }));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut cfg = two_entries();
        let err = cfg
            .add_entry("cellar", EntryProfile::new("192.0.2.99"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName { .. }));
    }

    #[test]
    fn scan_interval_is_bounded() {
        let mut cfg = Config::default();
        let profile = EntryProfile {
            scan_interval: 301,
            ..EntryProfile::new("192.0.2.5")
        };
        let err = cfg.add_entry("cellar", profile).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
        assert!(cfg.entries.is_empty());
    }

    #[test]
    fn unknown_output_default_is_rejected() {
        let mut cfg = Config::default();
        cfg.defaults.output = "xml".into();
        let err = cfg.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "defaults.output")
        );

        cfg.defaults.output = "json-compact".into();
        cfg.defaults.color = "sometimes".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn remove_clears_default() {
        let mut cfg = two_entries();
        cfg.remove_entry("cellar").unwrap();
        assert_eq!(cfg.default_entry, None);
        // A single remaining entry is still resolvable.
        assert_eq!(cfg.resolve_entry(None).unwrap().0, "garage");
        assert!(matches!(
            cfg.remove_entry("cellar"),
            Err(ConfigError::EntryNotFound { .. })
        ));
    }

    #[test]
    fn resolve_without_entries_fails() {
        let cfg = Config::default();
        assert!(matches!(cfg.resolve_entry(None), Err(ConfigError::NoEntry)));
        assert!(matches!(
            cfg.resolve_entry(Some("cellar")),
            Err(ConfigError::EntryNotFound { .. })
        ));
    }

    #[test]
    fn profile_translation_uses_defaults() {
        let defaults = Defaults::default();
        let cfg = profile_to_coordinator_config(&EntryProfile::new(" 192.0.2.5 "), &defaults);
        assert_eq!(cfg.host, "192.0.2.5");
        assert_eq!(cfg.poll_interval, Duration::from_secs(15));
        assert_eq!(cfg.timeout, Duration::from_secs(10));

        let profile = EntryProfile {
            scan_interval: 0,
            timeout: Some(3),
            ..EntryProfile::new("192.0.2.5")
        };
        let cfg = profile_to_coordinator_config(&profile, &defaults);
        assert!(!cfg.polling_enabled());
        assert_eq!(cfg.timeout, Duration::from_secs(3));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = two_entries();
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.defaults, Defaults::default());
        assert!(loaded.entries.is_empty());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "default_entry = \"cellar\"\n\n[entries.cellar]\nhost = \"192.0.2.5\"\n",
        )
        .unwrap();

        let loaded = load_config_from(&path).unwrap();
        let (_, profile) = loaded.resolve_entry(None).unwrap();
        assert_eq!(profile.scan_interval, 15);
        assert_eq!(profile.timeout, None);
        assert_eq!(loaded.defaults.output, "table");
    }

    #[test]
    fn invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[entries.cellar]\nhost = \"192.0.2.5\"\nscan_interval = 900\n")
            .unwrap();

        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::Validation { .. })
        ));
    }
}
