use async_trait::async_trait;
use tracing::debug;

use super::brightness::{to_device, to_presentation};
use super::{
    Entity, EntityCommand, EntityDescriptor, EntityState, LightState, Platform, unsupported,
};
use crate::coordinator::Coordinator;
use crate::error::CoreError;

/// The cellar's LED strip as a dimmable light.
///
/// On/off is derived from brightness: the device has no separate switch.
pub struct LightEntity {
    descriptor: EntityDescriptor,
    coordinator: Coordinator,
}

impl LightEntity {
    pub fn new(entry_id: &str, coordinator: Coordinator) -> Self {
        Self {
            descriptor: EntityDescriptor {
                unique_id: format!("{entry_id}_light"),
                name: "LED Light",
                icon: "mdi:lightbulb",
                platform: Platform::Light,
                device_class: None,
            },
            coordinator,
        }
    }

    pub fn state(&self) -> LightState {
        let state = self.coordinator.state();
        let percent = state.snapshot.as_ref().map(|s| s.led_brightness);

        LightState {
            available: state.is_available(),
            is_on: percent.is_some_and(|p| p > 0),
            brightness: percent.map(to_presentation),
        }
    }

    /// Turn on at `brightness` (0..=255, default full).
    pub async fn turn_on(&self, brightness: Option<u8>) -> Result<(), CoreError> {
        let percent = to_device(brightness.unwrap_or(u8::MAX));
        debug!(brightness, percent, "turning light on");
        self.set_percent(percent).await
    }

    pub async fn turn_off(&self) -> Result<(), CoreError> {
        debug!("turning light off");
        self.set_percent(0).await
    }

    async fn set_percent(&self, percent: u8) -> Result<(), CoreError> {
        self.coordinator.client().set_led_brightness(percent).await?;
        self.coordinator.request_refresh();
        Ok(())
    }
}

#[async_trait]
impl Entity for LightEntity {
    fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    fn read_state(&self) -> EntityState {
        EntityState::Light(self.state())
    }

    async fn invoke(&self, command: EntityCommand) -> Result<(), CoreError> {
        match command {
            EntityCommand::TurnOn { brightness } => self.turn_on(brightness).await,
            EntityCommand::TurnOff => self.turn_off().await,
            EntityCommand::Open | EntityCommand::Close | EntityCommand::Stop => {
                Err(unsupported(&self.descriptor, command))
            }
        }
    }
}
