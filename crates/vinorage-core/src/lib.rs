// vinorage-core: polling coordinator, entities and entry lifecycle on top of vinorage-api.

pub mod config;
pub mod coordinator;
pub mod entity;
pub mod entry;
pub mod error;
pub mod setup;
pub mod state;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{CoordinatorConfig, DEFAULT_SCAN_INTERVAL_SECS, MAX_SCAN_INTERVAL_SECS};
pub use coordinator::Coordinator;
pub use entity::{
    CoverEntity, CoverState, Entity, EntityCommand, EntityDescriptor, EntityState, LightEntity,
    LightState, Platform, entities_for,
};
pub use entry::{ConfigEntry, LoadedEntry, normalize_host};
pub use error::CoreError;
pub use setup::{SetupError, SetupInput, validate_input};
pub use state::{CoordinatorPhase, RefreshEvent, RefreshState};
pub use stream::StateStream;

// Device-level types consumers need without depending on vinorage-api directly.
pub use vinorage_api::{ActuatorCommand, DeviceStatus};
