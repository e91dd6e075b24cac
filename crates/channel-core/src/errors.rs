//! Unified error system for channel creation
//!
//! Every component reports failures through the single [`ChannelError`] type.
//! The variants mirror the failure classes of the creation protocol so the
//! orchestrator can record a precise reason when a run fails.

use serde::{Deserialize, Serialize};

/// Unified error type for all channel-creation operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ChannelError {
    /// Malformed or incomplete config-transaction envelope
    #[error("Parse error: {message}")]
    Parse {
        /// What could not be parsed
        message: String,
    },

    /// Signature set insufficient against the declared policy, or a bad policy descriptor
    #[error("Policy error: {message}")]
    Policy {
        /// Description of the policy failure
        message: String,
    },

    /// Identity context could not produce a valid signature
    #[error("Signing error: {message}")]
    Signing {
        /// Description of the signing failure
        message: String,
    },

    /// Connection-level failure talking to the ordering service
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure
        message: String,
    },

    /// Deadline exceeded
    #[error("Timeout: {operation} exceeded {timeout_ms}ms")]
    Timeout {
        /// Operation that timed out
        operation: String,
        /// Deadline that was exceeded
        timeout_ms: u64,
    },

    /// Ordering service rejected the request
    #[error("Server error ({status}): {message}")]
    Server {
        /// Status reported by the ordering service
        status: String,
        /// Additional information returned with the status
        message: String,
    },

    /// Request could not be assembled
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the invalid input
        message: String,
    },

    /// Invalid network profile or run configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Key material store failure
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage failure
        message: String,
    },

    /// Run cancelled at a state boundary
    #[error("Cancelled during {stage}")]
    Cancelled {
        /// Stage at which the cancellation was observed
        stage: String,
    },
}

/// Coarse classification of a [`ChannelError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`ChannelError::Parse`]
    Parse,
    /// See [`ChannelError::Policy`]
    Policy,
    /// See [`ChannelError::Signing`]
    Signing,
    /// See [`ChannelError::Transport`]
    Transport,
    /// See [`ChannelError::Timeout`]
    Timeout,
    /// See [`ChannelError::Server`]
    Server,
    /// See [`ChannelError::Validation`]
    Validation,
    /// See [`ChannelError::Config`]
    Config,
    /// See [`ChannelError::Storage`]
    Storage,
    /// See [`ChannelError::Cancelled`]
    Cancelled,
}

impl ChannelError {
    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a policy error
    pub fn policy(message: impl Into<String>) -> Self {
        Self::Policy {
            message: message.into(),
        }
    }

    /// Create a signing error
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Create a server rejection error
    pub fn server(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Server {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(stage: impl Into<String>) -> Self {
        Self::Cancelled {
            stage: stage.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Policy { .. } => ErrorKind::Policy,
            Self::Signing { .. } => ErrorKind::Signing,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Server { .. } => ErrorKind::Server,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Config { .. } => ErrorKind::Config,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }
}

/// Standard Result type for channel-creation operations
pub type Result<T> = std::result::Result<T, ChannelError>;

impl From<std::io::Error> for ChannelError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => Self::timeout("io", 0),
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::NotConnected
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof => Self::transport(err.to_string()),
            _ => Self::storage(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ChannelError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(format!("json: {err}"))
    }
}

impl From<serde_cbor::Error> for ChannelError {
    fn from(err: serde_cbor::Error) -> Self {
        Self::parse(format!("cbor: {err}"))
    }
}

impl From<hex::FromHexError> for ChannelError {
    fn from(err: hex::FromHexError) -> Self {
        Self::parse(format!("hex: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ChannelError::validation("channel name is empty");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Validation error: channel name is empty");
    }

    #[test]
    fn test_server_error_display() {
        let err = ChannelError::server("CONFLICT", "channel already exists");
        assert_eq!(
            err.to_string(),
            "Server error (CONFLICT): channel already exists"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(ChannelError::from(io_err).kind(), ErrorKind::Transport);

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(ChannelError::from(io_err).kind(), ErrorKind::Storage);
    }
}
