//! Transport error types.

use inspectkit_core::error::{InspectError, TransportErrorKind};
use thiserror::Error;

/// Errors raised by endpoints, backends and output sinks.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The endpoint could not bind its listening socket.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// The address that was requested.
        addr: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend refused to attach a session.
    #[error("Cannot attach session {session}: {message}")]
    Attach {
        /// The session that tried to attach.
        session: String,
        /// Why the attach was refused.
        message: String,
    },

    /// The backend rejected a posted command.
    #[error("Command '{method}' rejected: {message}")]
    CommandRejected {
        /// The rejected method.
        method: String,
        /// Why it was rejected.
        message: String,
    },

    /// The session sending the command is not attached to the backend.
    #[error("Session {session} is not attached")]
    NotAttached {
        /// The session id.
        session: String,
    },

    /// The notification channel was closed by the receiving side.
    #[error("Notification channel closed")]
    ChannelClosed,
}

impl TransportError {
    /// Create a command rejection error.
    pub fn rejected(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandRejected {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Get the transport error kind.
    #[must_use]
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            Self::Bind { .. } => TransportErrorKind::BindFailed,
            Self::Io(_) => TransportErrorKind::Io,
            Self::Attach { .. } | Self::NotAttached { .. } => TransportErrorKind::AttachFailed,
            Self::CommandRejected { .. } => TransportErrorKind::CommandRejected,
            Self::ChannelClosed => TransportErrorKind::ConnectionClosed,
        }
    }
}

impl From<TransportError> for InspectError {
    fn from(err: TransportError) -> Self {
        Self::Transport {
            kind: err.kind(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
