//! Clap derive structures for the `vinorage` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap + clap_complete so `build.rs` can include it.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vinorage -- control a Vinorage wine-cellar from the command line
#[derive(Debug, Parser)]
#[command(
    name = "vinorage",
    version,
    about = "Control Vinorage wine-cellar controllers from the command line",
    long_about = "Drives the LED lighting and the motorised lift of a Vinorage\n\
        wine-cellar controller over its local HTTP interface.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configured entry to use
    #[arg(long, short = 'e', env = "VINORAGE_ENTRY", global = true)]
    pub entry: Option<String>,

    /// Controller host or address (bypasses configured entries)
    #[arg(long, short = 'H', env = "VINORAGE_HOST", global = true)]
    pub host: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "VINORAGE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "VINORAGE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the controller state once and show both entities
    #[command(alias = "st")]
    Status,

    /// Control the LED light
    #[command(alias = "l")]
    Light(LightArgs),

    /// Drive the cellar lift
    #[command(alias = "c")]
    Cover(CoverArgs),

    /// Poll the controller and print every refresh until interrupted
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage configured entries
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Light ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LightArgs {
    #[command(subcommand)]
    pub command: LightCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightCommand {
    /// Turn the light on (full brightness unless given)
    On {
        /// Brightness on the 0-255 scale
        #[arg(long, short = 'b', conflicts_with = "percent")]
        brightness: Option<u8>,

        /// Brightness as the device's 0-100 percentage
        #[arg(long, short = 'p', value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: Option<u8>,
    },

    /// Turn the light off
    Off,
}

// ── Cover ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CoverArgs {
    #[command(subcommand)]
    pub command: CoverCommand,
}

#[derive(Debug, Subcommand)]
pub enum CoverCommand {
    /// Raise the cellar
    Open,
    /// Lower the cellar
    Close,
    /// Stop the lift
    Stop,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (overrides the entry's scan interval)
    #[arg(long, short = 'i', value_parser = clap::value_parser!(u64).range(1..=300))]
    pub interval: Option<u64>,

    /// Exit after this many refreshes
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Add an entry: test the connection and save it (prompts for missing values)
    Init {
        /// Entry name
        #[arg(long)]
        name: Option<String>,

        /// Seconds between polls (0 disables polling)
        #[arg(long, value_parser = clap::value_parser!(u64).range(0..=300))]
        scan_interval: Option<u64>,
    },

    /// Display the current configuration
    Show,

    /// List configured entries
    #[command(alias = "ls")]
    List,

    /// Remove an entry
    #[command(alias = "rm")]
    Remove {
        /// Entry name
        name: String,
    },

    /// Set the default entry
    Use {
        /// Entry name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
