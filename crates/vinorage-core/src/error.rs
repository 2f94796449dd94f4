// ── Core error types ──
//
// Errors surfaced by the coordinator, the entities and the entry lifecycle.
// `CoreError` is `Clone` because every caller joined to an in-flight refresh
// receives the same outcome; device-level causes are kept behind an `Arc`.

use std::sync::Arc;

use thiserror::Error;
use vinorage_api::ErrorKind;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Caller errors ────────────────────────────────────────────────
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("{entity} does not support '{command}'")]
    Unsupported { entity: String, command: String },

    // ── Device errors (wrapped, cause preserved) ─────────────────────
    #[error("{source}")]
    Communication {
        host: String,
        #[source]
        source: Arc<vinorage_api::Error>,
    },

    #[error("{source}")]
    Unexpected {
        host: String,
        #[source]
        source: Arc<vinorage_api::Error>,
    },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Coordinator for {host} has been shut down")]
    Shutdown { host: String },
}

impl CoreError {
    /// Returns `true` for timeouts, transport failures and non-2xx replies.
    pub fn is_communication(&self) -> bool {
        matches!(self, Self::Communication { .. })
    }

    /// Returns `true` if the failure happened before any I/O.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// The controller host involved, when known.
    pub fn host(&self) -> Option<&str> {
        match self {
            Self::Communication { host, .. }
            | Self::Unexpected { host, .. }
            | Self::Shutdown { host } => Some(host),
            Self::InvalidArgument { .. } | Self::Unsupported { .. } => None,
        }
    }

    /// The underlying device client error, if this came from one.
    pub fn api_error(&self) -> Option<&vinorage_api::Error> {
        match self {
            Self::Communication { source, .. } | Self::Unexpected { source, .. } => {
                Some(source.as_ref())
            }
            _ => None,
        }
    }
}

// ── Conversion from device client errors ─────────────────────────────

impl From<vinorage_api::Error> for CoreError {
    fn from(err: vinorage_api::Error) -> Self {
        let host = err.host().unwrap_or_default().to_owned();
        match err.kind() {
            ErrorKind::InvalidArgument => CoreError::InvalidArgument {
                message: match err {
                    vinorage_api::Error::InvalidArgument { message } => message,
                    other => other.to_string(),
                },
            },
            ErrorKind::Communication => CoreError::Communication {
                host,
                source: Arc::new(err),
            },
            ErrorKind::Unexpected => CoreError::Unexpected {
                host,
                source: Arc::new(err),
            },
        }
    }
}
