// Shared transport configuration for building reqwest::Client instances.
//
// The device client never owns a connection pool of its own: hosts hand in a
// `reqwest::Client`. This module is what such hosts use to build one.

use std::time::Duration;

/// Per-request time budget for every device operation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("vinorage/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub connect_timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: None,
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` from this config.
    ///
    /// The appliance only speaks plain HTTP on the local network, so no TLS
    /// or cookie settings are involved.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        builder
            .build()
            .map_err(|e| crate::error::Error::InvalidArgument {
                message: format!("failed to build HTTP client: {e}"),
            })
    }
}
