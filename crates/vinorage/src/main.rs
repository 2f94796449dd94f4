mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments; the matches record which flags were explicit
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli, &matches).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(mut cli: Cli, matches: &ArgMatches) -> Result<(), CliError> {
    // Shell completions generation
    if let Command::Completions(ref args) = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(args.shell, &mut cmd, "vinorage", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config()?;
    config::apply_defaults(&mut cli.global, matches, &cfg)?;

    match cli.command {
        // Config commands resolve their own entry
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global).await,

        // All other commands talk to a controller
        cmd => {
            let entry = config::resolve_entry(&cli.global, &cfg)?;

            tracing::debug!(command = ?cmd, host = %entry.host(), "dispatching command");
            commands::dispatch(cmd, entry, &cli.global).await
        }
    }
}
