// ── Published coordinator state ──
//
// Every completed refresh replaces the whole `RefreshState` value. Readers
// hold an `Arc` to one consistent version and never see a half-applied
// update.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use vinorage_api::DeviceStatus;

use crate::error::CoreError;

/// Where a coordinator is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorPhase {
    /// No refresh has completed yet.
    Idle,
    /// A snapshot is available (the latest refresh may still have failed).
    Ready,
    /// Refreshes have run but none has ever succeeded.
    Failed,
}

/// Snapshot of everything the coordinator knows.
#[derive(Debug, Clone, Default)]
pub struct RefreshState {
    /// Last successfully fetched device state.
    pub snapshot: Option<Arc<DeviceStatus>>,
    /// Error of the most recent refresh, cleared by the next success.
    pub last_error: Option<CoreError>,
    /// Number of completed refreshes, successful or not.
    pub sequence: u64,
    /// When the snapshot was fetched.
    pub last_success: Option<DateTime<Utc>>,
}

impl RefreshState {
    pub fn phase(&self) -> CoordinatorPhase {
        match (&self.snapshot, self.sequence) {
            (Some(_), _) => CoordinatorPhase::Ready,
            (None, 0) => CoordinatorPhase::Idle,
            (None, _) => CoordinatorPhase::Failed,
        }
    }

    /// Whether the most recent refresh succeeded.
    pub fn last_update_success(&self) -> bool {
        self.sequence > 0 && self.last_error.is_none()
    }

    /// Entities backed by this state are available only while the data is
    /// both present and fresh.
    pub fn is_available(&self) -> bool {
        self.snapshot.is_some() && self.last_error.is_none()
    }

    pub(crate) fn succeeded(&self, snapshot: Arc<DeviceStatus>) -> Self {
        Self {
            snapshot: Some(snapshot),
            last_error: None,
            sequence: self.sequence + 1,
            last_success: Some(Utc::now()),
        }
    }

    pub(crate) fn failed(&self, error: CoreError) -> Self {
        Self {
            snapshot: self.snapshot.clone(),
            last_error: Some(error),
            sequence: self.sequence + 1,
            last_success: self.last_success,
        }
    }
}

/// Broadcast to listeners once per completed refresh, after the new
/// [`RefreshState`] has been published.
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    Updated {
        sequence: u64,
        snapshot: Arc<DeviceStatus>,
    },
    Failed {
        sequence: u64,
        error: CoreError,
        /// The snapshot still being served, if any.
        stale: Option<Arc<DeviceStatus>>,
    },
}

impl RefreshEvent {
    pub fn sequence(&self) -> u64 {
        match self {
            Self::Updated { sequence, .. } | Self::Failed { sequence, .. } => *sequence,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
