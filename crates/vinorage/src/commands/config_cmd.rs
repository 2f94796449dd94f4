//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::Input;
use serde::Serialize;
use tabled::Tabled;
use vinorage_api::TransportConfig;
use vinorage_config::{Config, EntryProfile};
use vinorage_core::{
    CoreError, DEFAULT_SCAN_INTERVAL_SECS, MAX_SCAN_INTERVAL_SECS, SetupInput, validate_input,
};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

const DEFAULT_ENTRY_NAME: &str = "cellar";

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Collected `config init` values; prompts only for what flags left out.
struct InitValues {
    name: String,
    host: String,
    scan_interval: u64,
}

fn collect_init(
    name: Option<String>,
    host: Option<String>,
    scan_interval: Option<u64>,
) -> Result<InitValues, CliError> {
    let interactive = std::io::stdin().is_terminal();

    let host = match host {
        Some(host) => host,
        None if interactive => Input::new()
            .with_prompt("Controller host")
            .interact_text()
            .map_err(prompt_err)?,
        None => {
            return Err(CliError::Validation {
                field: "host".into(),
                reason: "pass --host when not running interactively".into(),
            });
        }
    };

    let name = match name {
        Some(name) => name,
        None if interactive => Input::new()
            .with_prompt("Entry name")
            .default(DEFAULT_ENTRY_NAME.to_owned())
            .interact_text()
            .map_err(prompt_err)?,
        None => DEFAULT_ENTRY_NAME.to_owned(),
    };

    let scan_interval = match scan_interval {
        Some(secs) => secs,
        None if interactive => Input::<u64>::new()
            .with_prompt(format!("Scan interval in seconds (0-{MAX_SCAN_INTERVAL_SECS})"))
            .default(DEFAULT_SCAN_INTERVAL_SECS)
            .validate_with(|secs: &u64| {
                if *secs <= MAX_SCAN_INTERVAL_SECS {
                    Ok(())
                } else {
                    Err(format!("must be between 0 and {MAX_SCAN_INTERVAL_SECS}"))
                }
            })
            .interact_text()
            .map_err(prompt_err)?,
        None => DEFAULT_SCAN_INTERVAL_SECS,
    };

    Ok(InitValues {
        name,
        host,
        scan_interval,
    })
}

// ── List view ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct EntryItem {
    name: String,
    host: String,
    scan_interval: u64,
    timeout: Option<u64>,
    default: bool,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Scan Interval")]
    scan_interval: String,
    #[tabled(rename = "Timeout")]
    timeout: String,
    #[tabled(rename = "Default")]
    default: String,
}

impl From<&EntryItem> for EntryRow {
    fn from(e: &EntryItem) -> Self {
        Self {
            name: e.name.clone(),
            host: e.host.clone(),
            scan_interval: if e.scan_interval == 0 {
                "off".into()
            } else {
                format!("{}s", e.scan_interval)
            },
            timeout: e.timeout.map(|t| format!("{t}s")).unwrap_or_default(),
            default: if e.default { "*".into() } else { String::new() },
        }
    }
}

fn entry_items(cfg: &Config) -> Vec<EntryItem> {
    let mut items: Vec<EntryItem> = cfg
        .entries
        .iter()
        .map(|(name, profile)| EntryItem {
            name: name.clone(),
            host: profile.host.clone(),
            scan_interval: profile.scan_interval,
            timeout: profile.timeout,
            default: cfg.default_entry.as_deref() == Some(name.as_str()),
        })
        .collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));
    items
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: test the connection, then save ────────────────────
        ConfigCommand::Init {
            name,
            scan_interval,
        } => {
            let mut cfg = config::load_config()?;
            let values = collect_init(name, global.host.clone(), scan_interval)?;

            let input = SetupInput::new(values.host)
                .with_poll_interval_secs(values.scan_interval)
                .with_timeout(config::timeout(global, &cfg));
            let http = TransportConfig::default()
                .with_timeout(input.timeout)
                .build_client()
                .map_err(CoreError::from)?;

            let entry = validate_input(&http, &input, cfg.hosts()).await?;
            cfg.add_entry(&values.name, EntryProfile::from_entry(&entry))?;
            let path = config::save_config(&cfg)?;

            output::notice(
                &format!("✓ Added entry '{}': {}", values.name, entry.title),
                global.quiet,
            );
            output::notice(
                &format!("  Configuration written to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| e.to_string()),
                |_| config::config_path().display().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── List ────────────────────────────────────────────────────
        ConfigCommand::List => {
            let cfg = config::load_config()?;
            if cfg.entries.is_empty() {
                output::notice(
                    "No entries configured. Run: vinorage --host <HOST> config init",
                    global.quiet,
                );
                return Ok(());
            }
            let items = entry_items(&cfg);
            let out = output::render_list(
                &global.output,
                &items,
                |e| EntryRow::from(e),
                |e| e.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Remove <name> ───────────────────────────────────────────
        ConfigCommand::Remove { name } => {
            let mut cfg = config::load_config()?;
            let removed = cfg.remove_entry(&name)?;
            config::save_config(&cfg)?;
            output::notice(
                &format!("✓ Removed entry '{name}' ({})", removed.host),
                global.quiet,
            );
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            cfg.resolve_entry(Some(&name))?;
            cfg.default_entry = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice(&format!("✓ Default entry set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn list_is_sorted_and_marks_default() {
        let mut cfg = Config::default();
        cfg.add_entry("garage", EntryProfile::new("192.0.2.6")).unwrap();
        cfg.add_entry("attic", EntryProfile::new("192.0.2.7")).unwrap();

        let items = entry_items(&cfg);
        assert_eq!(items[0].name, "attic");
        assert!(!items[0].default);
        assert!(items[1].default);

        let row = EntryRow::from(&items[1]);
        assert_eq!(row.scan_interval, "15s");
        assert_eq!(row.default, "*");
    }
}
