/*!
 * Error types for Meshlink
 */

use std::fmt;
use std::io;

use meshlink_connect::ConnectError;

use crate::local::ValidationError;

pub type Result<T> = std::result::Result<T, MeshlinkError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_REMOTE: i32 = 3;

#[derive(Debug)]
pub enum MeshlinkError {
    /// Transport error surfaced under the `propagate` policy
    Connect(ConnectError),

    /// Local property write rejected
    Validation(ValidationError),

    /// Positional and keyword arguments passed to the same call
    MixedArguments { path: String },

    /// Name not declared on a local object or proxy
    UnknownAttribute { path: String, name: String },

    /// State access on a proxy declared without a callable leaf
    NotCallable { path: String },

    /// Item access on a node that is not a named-object container
    NotAContainer { path: String },

    /// Configuration error
    Config(String),

    /// I/O error
    Io(io::Error),

    /// Deferred command did not complete (cancelled or panicked)
    Command(String),
}

impl MeshlinkError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            MeshlinkError::Connect(_) => EXIT_REMOTE,
            MeshlinkError::MixedArguments { .. }
            | MeshlinkError::UnknownAttribute { .. }
            | MeshlinkError::Config(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }

    /// Check if this error came from the transport layer
    pub fn is_transport(&self) -> bool {
        matches!(self, MeshlinkError::Connect(_))
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            MeshlinkError::Connect(_) => ErrorCategory::Transport,
            MeshlinkError::Validation(_) => ErrorCategory::Validation,
            MeshlinkError::MixedArguments { .. }
            | MeshlinkError::UnknownAttribute { .. }
            | MeshlinkError::NotCallable { .. }
            | MeshlinkError::NotAContainer { .. } => ErrorCategory::Usage,
            MeshlinkError::Config(_) => ErrorCategory::Configuration,
            MeshlinkError::Io(_) => ErrorCategory::IoError,
            MeshlinkError::Command(_) => ErrorCategory::Execution,
        }
    }
}

/// Error category for classification and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// RPC-level failures
    Transport,
    /// Local property constraint violations
    Validation,
    /// Misuse of the proxy API
    Usage,
    /// Configuration errors
    Configuration,
    /// I/O operation errors
    IoError,
    /// Deferred command failures
    Execution,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Transport => write!(f, "transport"),
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Usage => write!(f, "usage"),
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::IoError => write!(f, "io"),
            ErrorCategory::Execution => write!(f, "execution"),
        }
    }
}

impl fmt::Display for MeshlinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshlinkError::Connect(err) => write!(f, "Remote call failed: {}", err),
            MeshlinkError::Validation(err) => write!(f, "Invalid value: {}", err),
            MeshlinkError::MixedArguments { path } => {
                write!(
                    f,
                    "Cannot mix positional and keyword arguments when calling {}",
                    path
                )
            }
            MeshlinkError::UnknownAttribute { path, name } => {
                write!(f, "{} has no attribute '{}'", path, name)
            }
            MeshlinkError::NotCallable { path } => {
                write!(f, "{} does not hold a state of its own", path)
            }
            MeshlinkError::NotAContainer { path } => {
                write!(f, "{} is not a named-object container", path)
            }
            MeshlinkError::Config(msg) => write!(f, "Configuration error: {}", msg),
            MeshlinkError::Io(err) => write!(f, "I/O error: {}", err),
            MeshlinkError::Command(msg) => write!(f, "Command did not complete: {}", msg),
        }
    }
}

impl std::error::Error for MeshlinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MeshlinkError::Connect(err) => Some(err),
            MeshlinkError::Validation(err) => Some(err),
            MeshlinkError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConnectError> for MeshlinkError {
    fn from(err: ConnectError) -> Self {
        MeshlinkError::Connect(err)
    }
}

impl From<ValidationError> for MeshlinkError {
    fn from(err: ValidationError) -> Self {
        MeshlinkError::Validation(err)
    }
}

impl From<io::Error> for MeshlinkError {
    fn from(err: io::Error) -> Self {
        MeshlinkError::Io(err)
    }
}

impl From<serde_json::Error> for MeshlinkError {
    fn from(err: serde_json::Error) -> Self {
        MeshlinkError::Config(format!("JSON parse error: {}", err))
    }
}

impl From<tokio::task::JoinError> for MeshlinkError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            MeshlinkError::Command("cancelled".to_string())
        } else {
            MeshlinkError::Command(err.to_string())
        }
    }
}
