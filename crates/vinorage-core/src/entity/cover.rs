use async_trait::async_trait;
use tracing::debug;
use vinorage_api::ActuatorCommand;

use super::{
    CoverState, Entity, EntityCommand, EntityDescriptor, EntityState, Platform, unsupported,
};
use crate::coordinator::Coordinator;
use crate::error::CoreError;

/// The motorised cellar lift as a damper-class cover.
///
/// Open raises the cellar, close lowers it. The controller never reports the
/// lift position, so `is_closed` is always unknown.
pub struct CoverEntity {
    descriptor: EntityDescriptor,
    coordinator: Coordinator,
}

impl CoverEntity {
    pub fn new(entry_id: &str, coordinator: Coordinator) -> Self {
        Self {
            descriptor: EntityDescriptor {
                unique_id: format!("{entry_id}_cover"),
                name: "Wine Cellar",
                icon: "mdi:elevator",
                platform: Platform::Cover,
                device_class: Some("damper"),
            },
            coordinator,
        }
    }

    pub fn state(&self) -> CoverState {
        CoverState {
            available: self.coordinator.state().is_available(),
            is_closed: None,
        }
    }

    pub async fn open(&self) -> Result<(), CoreError> {
        self.actuate(ActuatorCommand::Up).await
    }

    pub async fn close(&self) -> Result<(), CoreError> {
        self.actuate(ActuatorCommand::Down).await
    }

    pub async fn stop(&self) -> Result<(), CoreError> {
        self.actuate(ActuatorCommand::Stop).await
    }

    async fn actuate(&self, command: ActuatorCommand) -> Result<(), CoreError> {
        debug!(%command, "driving cellar lift");
        self.coordinator.client().control_actuator(command).await?;
        self.coordinator.request_refresh();
        Ok(())
    }
}

#[async_trait]
impl Entity for CoverEntity {
    fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    fn read_state(&self) -> EntityState {
        EntityState::Cover(self.state())
    }

    async fn invoke(&self, command: EntityCommand) -> Result<(), CoreError> {
        match command {
            EntityCommand::Open => self.open().await,
            EntityCommand::Close => self.close().await,
            EntityCommand::Stop => self.stop().await,
            EntityCommand::TurnOn { .. } | EntityCommand::TurnOff => {
                Err(unsupported(&self.descriptor, command))
            }
        }
    }
}
