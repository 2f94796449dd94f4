// ── Setup flow ──
//
// Turns user input (host + poll interval) into a validated `ConfigEntry`.
// Reachability is checked with exactly one status fetch; hosts that are
// already configured are rejected after the check succeeds.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error};
use vinorage_api::{DEFAULT_TIMEOUT, ErrorKind, VinorageClient};

use crate::config::{CoordinatorConfig, DEFAULT_SCAN_INTERVAL_SECS, MAX_SCAN_INTERVAL_SECS};
use crate::entry::{ConfigEntry, normalize_host};

/// Values collected from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupInput {
    pub host: String,
    /// Seconds between polls, `0..=300`. Zero disables polling.
    pub poll_interval_secs: u64,
    pub timeout: Duration,
}

impl SetupInput {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            poll_interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Why the setup flow refused to create an entry.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Failed to connect")]
    CannotConnect {
        #[source]
        source: vinorage_api::Error,
    },

    #[error("Unexpected error")]
    Unknown {
        #[source]
        source: vinorage_api::Error,
    },

    #[error("Device {host} is already configured")]
    AlreadyConfigured { host: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl SetupError {
    /// Stable key for localized messages.
    pub fn translation_key(&self) -> &'static str {
        match self {
            Self::CannotConnect { .. } => "cannot_connect",
            Self::Unknown { .. } => "unknown",
            Self::AlreadyConfigured { .. } => "already_configured",
            Self::InvalidInput { .. } => "invalid_input",
        }
    }

    /// English message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::CannotConnect { .. } => "Failed to connect".into(),
            Self::Unknown { .. } => "Unexpected error".into(),
            Self::AlreadyConfigured { .. } => "Device is already configured".into(),
            Self::InvalidInput { message } => message.clone(),
        }
    }
}

/// Validate `input` against the device and the already-configured hosts.
///
/// Performs exactly one `GET /` when the input itself is well formed.
pub async fn validate_input<I, S>(
    http: &reqwest::Client,
    input: &SetupInput,
    existing_hosts: I,
) -> Result<ConfigEntry, SetupError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let host = input.host.trim();
    if host.is_empty() {
        return Err(SetupError::InvalidInput {
            message: "Host must not be empty".into(),
        });
    }
    if input.poll_interval_secs > MAX_SCAN_INTERVAL_SECS {
        return Err(SetupError::InvalidInput {
            message: format!(
                "Scan interval must be between 0 and {MAX_SCAN_INTERVAL_SECS} seconds, got {}",
                input.poll_interval_secs
            ),
        });
    }

    let client = VinorageClient::with_client(http.clone(), host)
        .map_err(|e| SetupError::InvalidInput {
            message: e.to_string(),
        })?
        .with_timeout(input.timeout);

    debug!(%host, "testing connection");
    if let Err(e) = client.fetch_status().await {
        error!(%host, error = %e, "setup connection test failed");
        return Err(match e.kind() {
            ErrorKind::Communication => SetupError::CannotConnect { source: e },
            ErrorKind::InvalidArgument | ErrorKind::Unexpected => SetupError::Unknown { source: e },
        });
    }

    let identity = normalize_host(host);
    if existing_hosts
        .into_iter()
        .any(|existing| normalize_host(existing.as_ref()) == identity)
    {
        return Err(SetupError::AlreadyConfigured {
            host: host.to_owned(),
        });
    }

    Ok(ConfigEntry::new(
        CoordinatorConfig::new(host)
            .with_poll_interval_secs(input.poll_interval_secs)
            .with_timeout(input.timeout),
    ))
}
