// ── Runtime coordinator configuration ──
//
// Describes *which* controller to poll and how often. Never touches disk:
// the CLI (or any other host) builds a `CoordinatorConfig` and hands it in.

use std::time::Duration;

use vinorage_api::DEFAULT_TIMEOUT;

/// Poll interval used when none is configured.
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 15;

/// Largest poll interval the setup flow accepts.
pub const MAX_SCAN_INTERVAL_SECS: u64 = 300;

/// Configuration for one coordinator. Immutable once the coordinator exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Controller host, optionally with a port (e.g. `192.0.2.5`).
    pub host: String,
    /// Time between scheduled refreshes. `Duration::ZERO` disables polling;
    /// the snapshot then only changes on manual refreshes.
    pub poll_interval: Duration,
    /// Per-request time budget.
    pub timeout: Duration,
}

impl CoordinatorConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            poll_interval: Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval = Duration::from_secs(secs);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether the coordinator should run a periodic ticker.
    pub fn polling_enabled(&self) -> bool {
        !self.poll_interval.is_zero()
    }
}
