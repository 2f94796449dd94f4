// Control endpoints
//
// Both endpoints take a single form field and reply with a page we ignore;
// any 2xx status counts as success.

use tracing::debug;

use crate::client::{Operation, VinorageClient};
use crate::error::Error;
use crate::models::{ActuatorCommand, MAX_LED_BRIGHTNESS, checked_brightness};

impl VinorageClient {
    /// Set the LED brightness in percent.
    ///
    /// `POST /led_set` with `level=<percent>`
    ///
    /// Values above 100 are rejected before any request is sent.
    pub async fn set_led_brightness(&self, percent: u8) -> Result<(), Error> {
        if percent > MAX_LED_BRIGHTNESS {
            return Err(Error::InvalidArgument {
                message: format!("Brightness must be between 0 and 100, got {percent}"),
            });
        }

        debug!(host = %self.host(), percent, "setting LED brightness");
        self.post_form("led_set", &[("level", percent)], Operation::SetLedBrightness)
            .await
    }

    /// [`set_led_brightness`](Self::set_led_brightness) for untyped input
    /// (CLI arguments, config values).
    pub async fn set_led_brightness_raw(&self, percent: i64) -> Result<(), Error> {
        let percent = checked_brightness(percent)?;
        self.set_led_brightness(percent).await
    }

    /// Drive the cellar actuator.
    ///
    /// `POST /act_control` with `act=<0|1|2>`
    pub async fn control_actuator(&self, command: ActuatorCommand) -> Result<(), Error> {
        debug!(host = %self.host(), %command, "controlling actuator");
        self.post_form("act_control", &[("act", command.code())], Operation::ControlActuator)
            .await
    }

    /// [`control_actuator`](Self::control_actuator) for a raw command code.
    ///
    /// Codes outside `0` (stop), `1` (up) and `2` (down) are rejected before
    /// any request is sent.
    pub async fn control_actuator_raw(&self, command: u8) -> Result<(), Error> {
        let command = ActuatorCommand::try_from(command)?;
        self.control_actuator(command).await
    }
}
