// ── Device entities ──
//
// The two controllable abstractions exposed per controller. Hosts adapt the
// `Entity` capability trait to whatever registration protocol they use; the
// core never depends on that protocol.

pub mod brightness;
mod cover;
mod light;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::coordinator::Coordinator;
use crate::error::CoreError;

pub use cover::CoverEntity;
pub use light::LightEntity;

/// Entity platform, mirroring how hosts group entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Light,
    Cover,
}

/// Static metadata describing an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDescriptor {
    /// Stable id: `<entry id>_<platform>`.
    pub unique_id: String,
    pub name: &'static str,
    pub icon: &'static str,
    pub platform: Platform,
    pub device_class: Option<&'static str>,
}

/// State of a dimmable light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LightState {
    pub available: bool,
    pub is_on: bool,
    /// Presentation brightness (0..=255), `None` until the first snapshot.
    pub brightness: Option<u8>,
}

/// State of the cellar actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoverState {
    pub available: bool,
    /// The controller cannot report its position; always `None`.
    pub is_closed: Option<bool>,
}

/// Current state of any entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum EntityState {
    Light(LightState),
    Cover(CoverState),
}

impl EntityState {
    pub fn available(&self) -> bool {
        match self {
            Self::Light(s) => s.available,
            Self::Cover(s) => s.available,
        }
    }
}

/// Commands an entity may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityCommand {
    /// Turn the light on; `brightness` is in presentation range, default 255.
    TurnOn { brightness: Option<u8> },
    TurnOff,
    Open,
    Close,
    Stop,
}

impl EntityCommand {
    pub fn name(self) -> &'static str {
        match self {
            Self::TurnOn { .. } => "turn_on",
            Self::TurnOff => "turn_off",
            Self::Open => "open",
            Self::Close => "close",
            Self::Stop => "stop",
        }
    }
}

/// Capability interface implemented by every entity.
#[async_trait]
pub trait Entity: Send + Sync {
    fn descriptor(&self) -> &EntityDescriptor;

    /// Read the state from the coordinator's cache. Never does I/O.
    fn read_state(&self) -> EntityState;

    /// Send a command to the device, then request a refresh.
    async fn invoke(&self, command: EntityCommand) -> Result<(), CoreError>;
}

/// Build the light and the cover for a loaded entry.
pub fn entities_for(entry_id: &str, coordinator: &Coordinator) -> Vec<Arc<dyn Entity>> {
    vec![
        Arc::new(LightEntity::new(entry_id, coordinator.clone())),
        Arc::new(CoverEntity::new(entry_id, coordinator.clone())),
    ]
}

pub(crate) fn unsupported(descriptor: &EntityDescriptor, command: EntityCommand) -> CoreError {
    CoreError::Unsupported {
        entity: descriptor.name.to_owned(),
        command: command.name().to_owned(),
    }
}
