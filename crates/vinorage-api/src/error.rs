use std::time::Duration;

use thiserror::Error;

use crate::client::Operation;

/// Top-level error type for the `vinorage-api` crate.
///
/// Every variant that involves the device carries the host and the operation
/// being attempted. Use [`Error::kind`] to classify a failure into the three
/// buckets consumers care about.
#[derive(Debug, Error)]
pub enum Error {
    // ── Caller misuse (no I/O attempted) ────────────────────────────
    /// A caller-supplied value was out of range.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The configured host does not form a valid `http://` base URL.
    #[error("Invalid host '{host}': {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },

    // ── Communication ───────────────────────────────────────────────
    /// The request did not complete within its time budget.
    #[error("Timeout {operation} on {host} after {timeout:?}")]
    Timeout {
        host: String,
        operation: Operation,
        timeout: Duration,
    },

    /// Connection, DNS or body-transfer failure.
    #[error("Error {operation} on {host}: {source}")]
    Transport {
        host: String,
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    /// The device answered with a non-2xx status.
    #[error("Error {operation} on {host}: HTTP {status}")]
    Status {
        host: String,
        operation: Operation,
        status: u16,
    },

    // ── Last resort ─────────────────────────────────────────────────
    /// Anything the classification above does not recognise.
    #[error("Unexpected error {operation} on {host}: {source}")]
    Unexpected {
        host: String,
        operation: Operation,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Out-of-range input; the device was never contacted.
    InvalidArgument,
    /// Timeout, transport failure or non-2xx status. Recoverable.
    Communication,
    /// Anything else.
    Unexpected,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } | Self::InvalidHost { .. } => ErrorKind::InvalidArgument,
            Self::Timeout { .. } | Self::Transport { .. } | Self::Status { .. } => {
                ErrorKind::Communication
            }
            Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    /// Returns `true` for timeouts, transport failures and non-2xx replies.
    pub fn is_communication(&self) -> bool {
        self.kind() == ErrorKind::Communication
    }

    /// Returns `true` if this error was raised before any request was sent.
    pub fn is_invalid_argument(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }

    /// The host the failing request targeted, if one was involved.
    pub fn host(&self) -> Option<&str> {
        match self {
            Self::InvalidArgument { .. } => None,
            Self::InvalidHost { host, .. }
            | Self::Timeout { host, .. }
            | Self::Transport { host, .. }
            | Self::Status { host, .. }
            | Self::Unexpected { host, .. } => Some(host),
        }
    }

    /// Classify a `reqwest` failure for the given request.
    ///
    /// Timeouts, connection-level errors, body errors and status errors are
    /// communication failures. The default arm keeps the original error as
    /// the source of an [`Error::Unexpected`].
    pub(crate) fn from_reqwest(
        err: reqwest::Error,
        host: &str,
        operation: Operation,
        timeout: Duration,
    ) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                host: host.to_owned(),
                operation,
                timeout,
            };
        }

        if let Some(status) = err.status() {
            return Self::Status {
                host: host.to_owned(),
                operation,
                status: status.as_u16(),
            };
        }

        if err.is_connect() || err.is_request() || err.is_body() || err.is_decode() {
            return Self::Transport {
                host: host.to_owned(),
                operation,
                source: err,
            };
        }

        Self::Unexpected {
            host: host.to_owned(),
            operation,
            source: Box::new(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_has_no_host() {
        let err = Error::InvalidArgument {
            message: "Brightness must be between 0 and 100, got 101".into(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.host().is_none());
        assert!(!err.is_communication());
    }

    #[test]
    fn status_error_is_communication_with_context() {
        let err = Error::Status {
            host: "192.0.2.5".into(),
            operation: Operation::SetLedBrightness,
            status: 500,
        };
        assert!(err.is_communication());
        assert_eq!(err.host(), Some("192.0.2.5"));
        assert_eq!(
            err.to_string(),
            "Error setting LED brightness on 192.0.2.5: HTTP 500"
        );
    }

    #[test]
    fn timeout_message_names_the_operation() {
        let err = Error::Timeout {
            host: "cellar.local".into(),
            operation: Operation::FetchStatus,
            timeout: Duration::from_secs(10),
        };
        assert_eq!(
            err.to_string(),
            "Timeout fetching information on cellar.local after 10s"
        );
    }

    #[test]
    fn timeout_message_keeps_sub_second_budgets() {
        let err = Error::Timeout {
            host: "cellar.local".into(),
            operation: Operation::FetchStatus,
            timeout: Duration::from_millis(300),
        };
        assert_eq!(
            err.to_string(),
            "Timeout fetching information on cellar.local after 300ms"
        );
    }

    #[test]
    fn unexpected_keeps_its_source() {
        use std::error::Error as _;

        let err = Error::Unexpected {
            host: "cellar.local".into(),
            operation: Operation::ControlActuator,
            source: "boom".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("boom"));
    }
}
