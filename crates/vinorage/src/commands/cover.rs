//! Cover (cellar lift) command handlers.

use vinorage_core::{EntityCommand, LoadedEntry, Platform};

use crate::cli::{CoverArgs, CoverCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    loaded: &LoadedEntry,
    args: CoverArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (command, message) = match args.command {
        CoverCommand::Open => (EntityCommand::Open, "Cellar rising"),
        CoverCommand::Close => (EntityCommand::Close, "Cellar lowering"),
        CoverCommand::Stop => (EntityCommand::Stop, "Cellar lift stopped"),
    };

    util::entity(loaded, Platform::Cover)?
        .invoke(command)
        .await?;
    output::notice(message, global.quiet);
    Ok(())
}
