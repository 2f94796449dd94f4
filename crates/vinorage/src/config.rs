//! CLI-side configuration: resolves `GlobalOpts` + the TOML entries into
//! the `ConfigEntry` the core loads.
//!
//! Core never sees these types -- it receives a pre-built `CoordinatorConfig`.

use std::time::Duration;

use clap::ArgMatches;
use clap::ValueEnum;
use clap::parser::ValueSource;
use vinorage_config::{Config, ConfigError, profile_to_coordinator_config};
use vinorage_core::{ConfigEntry, CoordinatorConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use vinorage_config::{config_path, save_config};

/// Load the config file; a missing file yields defaults, an invalid one is
/// an error.
pub fn load_config() -> Result<Config, CliError> {
    Ok(vinorage_config::load_config()?)
}

/// Fill `--output` and `--color` from `[defaults]` unless the flag or its
/// env var was given.
pub fn apply_defaults(
    global: &mut GlobalOpts,
    matches: &ArgMatches,
    cfg: &Config,
) -> Result<(), CliError> {
    if !explicit(matches, "output") {
        global.output = parse_default("defaults.output", &cfg.defaults.output)?;
    }
    if !explicit(matches, "color") {
        global.color = parse_default("defaults.color", &cfg.defaults.color)?;
    }
    Ok(())
}

fn explicit(matches: &ArgMatches, id: &str) -> bool {
    matches!(
        matches.value_source(id),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

fn parse_default<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

/// Effective request timeout: flag/env > config defaults.
pub fn timeout(global: &GlobalOpts, cfg: &Config) -> Duration {
    Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout))
}

/// Resolve the controller to talk to.
///
/// `--host` bypasses the configured entries entirely; otherwise the entry
/// named by `--entry`, the default entry, or the only entry is used.
pub fn resolve_entry(global: &GlobalOpts, cfg: &Config) -> Result<ConfigEntry, CliError> {
    if let Some(ref host) = global.host {
        let config = CoordinatorConfig::new(host.trim()).with_timeout(timeout(global, cfg));
        return Ok(ConfigEntry::new(config));
    }

    let (_, profile) = cfg
        .resolve_entry(global.entry.as_deref())
        .map_err(|e| entry_error(e, cfg))?;

    let mut config = profile_to_coordinator_config(profile, &cfg.defaults);
    if let Some(secs) = global.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(ConfigEntry::new(config))
}

/// Like `From<ConfigError>`, but lists the entries that do exist.
fn entry_error(err: ConfigError, cfg: &Config) -> CliError {
    match err {
        ConfigError::EntryNotFound { name } => {
            let mut available: Vec<_> = cfg.entries.keys().cloned().collect();
            available.sort();
            CliError::EntryNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            }
        }
        other => other.into(),
    }
}
