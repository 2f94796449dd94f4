//! Command dispatch: bridges CLI args -> entities / coordinator -> output formatting.

pub mod config_cmd;
pub mod cover;
pub mod light;
pub mod status;
pub mod util;
pub mod watch;

use vinorage_core::ConfigEntry;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a controller-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    entry: ConfigEntry,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(entry, global).await,
        Command::Light(args) => {
            let loaded = util::load_once(entry).await?;
            let result = light::handle(&loaded, args, global).await;
            loaded.unload().await;
            result
        }
        Command::Cover(args) => {
            let loaded = util::load_once(entry).await?;
            let result = cover::handle(&loaded, args, global).await;
            loaded.unload().await;
            result
        }
        Command::Watch(args) => watch::handle(entry, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
