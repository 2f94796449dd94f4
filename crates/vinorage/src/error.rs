//! CLI error types with miette diagnostics.
//!
//! Maps core, setup and config errors into user-facing errors with
//! actionable help text and stable exit codes.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use vinorage_config::ConfigError;
use vinorage_core::{CoreError, SetupError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const INVALID_ARGUMENT: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Device ───────────────────────────────────────────────────────

    #[error("Could not reach the controller at {host}")]
    #[diagnostic(
        code(vinorage::connection_failed),
        help(
            "Check that the controller is powered and on the same network.\n\
             Host: {host}"
        )
    )]
    ConnectionFailed {
        host: String,
        #[source]
        source: CoreError,
    },

    #[error("Controller at {host} did not answer within {timeout:?}")]
    #[diagnostic(
        code(vinorage::timeout),
        help("Increase the timeout with --timeout or check the controller's network link.")
    )]
    Timeout { host: String, timeout: Duration },

    #[error("Unexpected error talking to {host}")]
    #[diagnostic(code(vinorage::unexpected))]
    Unexpected {
        host: String,
        #[source]
        source: CoreError,
    },

    #[error("Invalid argument: {message}")]
    #[diagnostic(code(vinorage::invalid_argument))]
    InvalidArgument { message: String },

    #[error("{entity} does not support '{command}'")]
    #[diagnostic(code(vinorage::unsupported))]
    Unsupported { entity: String, command: String },

    // ── Setup ────────────────────────────────────────────────────────

    #[error("Setup failed: {message}")]
    #[diagnostic(code(vinorage::setup), help("{hint}"))]
    SetupFailed {
        key: &'static str,
        message: String,
        hint: String,
        #[source]
        source: SetupError,
    },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Entry '{name}' not found in configuration")]
    #[diagnostic(
        code(vinorage::entry_not_found),
        help(
            "Available entries: {available}\n\
             Add one with: vinorage --host <HOST> config init"
        )
    )]
    EntryNotFound { name: String, available: String },

    #[error("No controller selected")]
    #[diagnostic(
        code(vinorage::no_config),
        help(
            "Pass --host <HOST>, or add an entry with: vinorage --host <HOST> config init\n\
             Config file: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("{message}")]
    #[diagnostic(code(vinorage::conflict))]
    Conflict { message: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vinorage::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(vinorage::config))]
    Config(Box<ConfigError>),

    #[error("Internal error: {message}")]
    #[diagnostic(code(vinorage::internal))]
    Internal { message: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::InvalidArgument { .. } => exit_code::INVALID_ARGUMENT,
            Self::Unsupported { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::EntryNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::SetupFailed { key, .. } => match *key {
                "cannot_connect" => exit_code::CONNECTION,
                "already_configured" => exit_code::CONFLICT,
                "invalid_input" => exit_code::USAGE,
                _ => exit_code::GENERAL,
            },
            Self::Unexpected { .. }
            | Self::NoConfig { .. }
            | Self::Config(_)
            | Self::Internal { .. }
            | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let host = err.host().unwrap_or_default().to_owned();
        let timeout = match err.api_error() {
            Some(vinorage_api::Error::Timeout { timeout, .. }) => Some(*timeout),
            _ => None,
        };

        match err {
            CoreError::Communication { .. } => match timeout {
                Some(timeout) => CliError::Timeout { host, timeout },
                None => CliError::ConnectionFailed { host, source: err },
            },

            CoreError::Unexpected { .. } => CliError::Unexpected { host, source: err },

            CoreError::InvalidArgument { message } => CliError::InvalidArgument { message },

            CoreError::Unsupported { entity, command } => {
                CliError::Unsupported { entity, command }
            }

            CoreError::Shutdown { .. } => CliError::Internal {
                message: format!("coordinator for {host} was shut down"),
            },
        }
    }
}

// ── SetupError → CliError mapping ────────────────────────────────────

impl From<SetupError> for CliError {
    fn from(err: SetupError) -> Self {
        let hint = match &err {
            SetupError::CannotConnect { source } => format!(
                "{source}\nCheck the host and that the controller is reachable."
            ),
            SetupError::Unknown { source } => source.to_string(),
            SetupError::AlreadyConfigured { .. } => {
                "List configured entries with: vinorage config list".into()
            }
            SetupError::InvalidInput { .. } => {
                "Hosts are bare names or addresses, optionally with a port.".into()
            }
        };

        CliError::SetupFailed {
            key: err.translation_key(),
            message: err.user_message(),
            hint,
            source: err,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::EntryNotFound { name } => CliError::EntryNotFound {
                name,
                available: "(see: vinorage config list)".into(),
            },
            ConfigError::NoEntry => CliError::NoConfig {
                path: vinorage_config::config_path().display().to_string(),
            },
            ConfigError::DuplicateName { .. } | ConfigError::DuplicateHost { .. } => {
                CliError::Conflict {
                    message: err.to_string(),
                }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vinorage_api::Operation;

    use super::*;

    #[test]
    fn timeout_gets_its_own_exit_code() {
        let core = CoreError::from(vinorage_api::Error::Timeout {
            host: "192.0.2.5".into(),
            operation: Operation::FetchStatus,
            timeout: Duration::from_millis(1500),
        });
        let err = CliError::from(core);
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
        assert_eq!(
            err.to_string(),
            "Controller at 192.0.2.5 did not answer within 1.5s"
        );
    }

    #[test]
    fn http_status_is_a_connection_failure() {
        let core = CoreError::Communication {
            host: "192.0.2.5".into(),
            source: Arc::new(vinorage_api::Error::Status {
                host: "192.0.2.5".into(),
                operation: Operation::SetLedBrightness,
                status: 500,
            }),
        };
        assert_eq!(CliError::from(core).exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn invalid_argument_exit_code() {
        let err = CliError::from(CoreError::InvalidArgument {
            message: "Brightness must be between 0 and 100, got 101".into(),
        });
        assert_eq!(err.exit_code(), exit_code::INVALID_ARGUMENT);
    }

    #[test]
    fn setup_errors_keep_their_key() {
        let err = CliError::from(SetupError::AlreadyConfigured {
            host: "192.0.2.5".into(),
        });
        assert!(matches!(err, CliError::SetupFailed { key: "already_configured", .. }));
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
    }

    #[test]
    fn missing_entry_is_not_found() {
        let err = CliError::from(ConfigError::EntryNotFound {
            name: "garage".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }
}
