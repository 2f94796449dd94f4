// Wire-level types for the Vinorage controller.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Highest value accepted by `/led_set`.
pub const MAX_LED_BRIGHTNESS: u8 = 100;

/// State scraped from the controller's status page.
///
/// Produced only by [`VinorageClient::fetch_status`](crate::VinorageClient::fetch_status).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// LED strip brightness in percent (`0..=100`).
    pub led_brightness: u8,
}

/// Commands understood by `/act_control`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ActuatorCommand {
    Stop = 0,
    Up = 1,
    Down = 2,
}

impl ActuatorCommand {
    /// The value sent as `act=<n>`.
    pub fn code(self) -> u8 {
        match self {
            Self::Stop => 0,
            Self::Up => 1,
            Self::Down => 2,
        }
    }
}

impl TryFrom<u8> for ActuatorCommand {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Stop),
            1 => Ok(Self::Up),
            2 => Ok(Self::Down),
            other => Err(Error::InvalidArgument {
                message: format!(
                    "Command must be 0 (stop), 1 (up), or 2 (down), got {other}"
                ),
            }),
        }
    }
}

/// Validate a brightness value from an untyped source.
pub(crate) fn checked_brightness(value: i64) -> Result<u8, Error> {
    u8::try_from(value)
        .ok()
        .filter(|pct| *pct <= MAX_LED_BRIGHTNESS)
        .ok_or_else(|| Error::InvalidArgument {
            message: format!("Brightness must be between 0 and 100, got {value}"),
        })
}
