//! Light command handlers.

use vinorage_core::entity::brightness::{to_device, to_presentation};
use vinorage_core::{EntityCommand, LoadedEntry, Platform};

use crate::cli::{GlobalOpts, LightArgs, LightCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    loaded: &LoadedEntry,
    args: LightArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let light = util::entity(loaded, Platform::Light)?;

    match args.command {
        LightCommand::On {
            brightness,
            percent,
        } => {
            let brightness = brightness.or_else(|| percent.map(to_presentation));
            light
                .invoke(EntityCommand::TurnOn { brightness })
                .await?;
            let percent = to_device(brightness.unwrap_or(u8::MAX));
            output::notice(&format!("Light on at {percent}%"), global.quiet);
        }
        LightCommand::Off => {
            light.invoke(EntityCommand::TurnOff).await?;
            output::notice("Light off", global.quiet);
        }
    }
    Ok(())
}
