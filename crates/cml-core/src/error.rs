//! Error types for cml-core.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for cml-core operations.
pub type Result<T> = std::result::Result<T, CmlError>;

/// Errors that can occur while talking to a CML server.
#[derive(Debug, Error)]
pub enum CmlError {
    /// An operation was invoked before any session was initialized.
    #[error("not authenticated: call initialize_client first")]
    Unauthenticated,

    /// The session could not be established.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The server answered a well-formed request with a non-success status.
    #[error("CML API error ({status}) on {endpoint}: {message}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Request path that failed
        endpoint: String,
        /// Message reported by the server
        message: String,
    },

    /// The server answered with success but the body was not what we expected.
    #[error("unexpected response from {endpoint}: {message}")]
    UnexpectedResponse {
        /// Request path
        endpoint: String,
        /// What was wrong with the body
        message: String,
    },

    /// No free non-reserved interface on a node.
    #[error("no available physical interface on node {node_id}")]
    InterfaceExhausted {
        /// The node that ran out of interfaces
        node_id: String,
    },

    /// Network-level failure (connect, DNS, timeout, TLS on an established session).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Arguments rejected before any request was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CmlError {
    /// Classify this error into one of the caller-facing kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::AuthenticationFailed(_) => ErrorKind::AuthenticationFailure,
            Self::Remote { .. } | Self::UnexpectedResponse { .. } => ErrorKind::RemoteError,
            Self::InterfaceExhausted { .. } => ErrorKind::InterfaceExhaustion,
            Self::Transport(_) => ErrorKind::TransportError,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    pub(crate) fn remote(status: u16, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub(crate) fn unexpected(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

/// Caller-facing error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthenticated,
    AuthenticationFailure,
    RemoteError,
    InterfaceExhaustion,
    TransportError,
    InvalidInput,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::AuthenticationFailure => "authentication_failure",
            Self::RemoteError => "remote_error",
            Self::InterfaceExhaustion => "interface_exhaustion",
            Self::TransportError => "transport_error",
            Self::InvalidInput => "invalid_input",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
