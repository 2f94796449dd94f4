// vinorage-api: Async Rust client for the Vinorage wine-cellar controller

pub mod client;
mod control;
pub mod error;
pub mod models;
pub mod status;
pub mod transport;

pub use client::{Operation, VinorageClient};
pub use error::{Error, ErrorKind};
pub use models::{ActuatorCommand, DeviceStatus, MAX_LED_BRIGHTNESS};
pub use status::parse_status_page;
pub use transport::{DEFAULT_TIMEOUT, TransportConfig};
