//! Unified error handling for inspectkit.
//!
//! All fallible operations in the workspace return [`InspectError`]. Lower
//! layers (transport, backend) have their own error types that convert into
//! it, so callers only ever match on one enum.
//!
//! # Error Categories
//!
//! - **Lifecycle**: an operation was attempted in the wrong session state
//!   ([`InspectError::AlreadyOpen`], [`InspectError::NotOpen`],
//!   [`InspectError::AlreadyConnected`], [`InspectError::NotConnected`])
//! - **Dispatch**: a listener failed while an event was being emitted
//!   ([`InspectError::Listener`])
//! - **Resource**: the endpoint or backend could not do its job
//!   ([`InspectError::Transport`])
//! - **Configuration**: a configuration document could not be used
//!   ([`InspectError::Config`])
//!
//! Registration operations (`on`, `off`, `once`, ...) never fail and have no
//! error variant.

use std::fmt;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error type for error sources.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type for inspectkit.
#[derive(Error, Diagnostic, Debug)]
pub enum InspectError {
    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// `open` was called while an endpoint is already listening.
    #[error("Inspector is already open at {url}")]
    #[diagnostic(
        code(inspect::session::already_open),
        help("Call close() before opening the inspector again")
    )]
    AlreadyOpen {
        /// The URL of the endpoint that is already listening.
        url: String,
    },

    /// `connect` was called before `open`.
    #[error("Inspector is not open")]
    #[diagnostic(
        code(inspect::session::not_open),
        help("Call open(port, host) before connecting")
    )]
    NotOpen,

    /// `connect` was called on a session that is already connected.
    #[error("Session is already connected")]
    #[diagnostic(code(inspect::session::already_connected))]
    AlreadyConnected,

    /// `post` was called on a session that is not connected.
    #[error("Session is not connected")]
    #[diagnostic(
        code(inspect::session::not_connected),
        help("Call connect() before posting commands")
    )]
    NotConnected,

    // ========================================================================
    // Dispatch Errors
    // ========================================================================
    /// A listener returned an error while an event was being emitted.
    ///
    /// The emit pass that produced this error was aborted: listeners after
    /// the failing one were not invoked.
    #[error("Listener for '{event}' failed: {source}")]
    #[diagnostic(code(inspect::emitter::listener_failed))]
    Listener {
        /// The event being emitted.
        event: String,
        /// The listener's error.
        #[source]
        source: ListenerError,
    },

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// The endpoint or backend failed.
    #[error("Transport error ({kind}): {message}")]
    #[diagnostic(code(inspect::transport::error))]
    Transport {
        /// Classification of the failure.
        kind: TransportErrorKind,
        /// Human-readable error message.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<BoxError>,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A configuration document could not be parsed or is invalid.
    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(inspect::config::invalid))]
    Config {
        /// Human-readable error message.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<BoxError>,
    },

    // ========================================================================
    // Context Wrapper
    // ========================================================================
    /// An error with additional context.
    #[error("{context}: {source}")]
    #[diagnostic(code(inspect::context))]
    WithContext {
        /// Description of what was being attempted.
        context: String,
        /// The wrapped error.
        #[source]
        source: Box<InspectError>,
    },
}

impl InspectError {
    /// Create a transport error without an underlying source.
    pub fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error from an underlying error.
    pub fn config(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Check whether this error (or the error it wraps) is a lifecycle error.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        match self {
            Self::AlreadyOpen { .. }
            | Self::NotOpen
            | Self::AlreadyConnected
            | Self::NotConnected => true,
            Self::WithContext { source, .. } => source.is_lifecycle(),
            _ => false,
        }
    }

    /// The transport error kind, if this is a transport error.
    #[must_use]
    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            Self::Transport { kind, .. } => Some(*kind),
            Self::WithContext { source, .. } => source.transport_kind(),
            _ => None,
        }
    }
}

/// Classification of transport and backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// The endpoint could not bind its listening socket.
    BindFailed,
    /// The backend refused to attach a session.
    AttachFailed,
    /// The backend rejected a posted command.
    CommandRejected,
    /// The notification channel was closed.
    ConnectionClosed,
    /// Any other I/O failure.
    Io,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BindFailed => write!(f, "bind failed"),
            Self::AttachFailed => write!(f, "attach failed"),
            Self::CommandRejected => write!(f, "command rejected"),
            Self::ConnectionClosed => write!(f, "connection closed"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

/// Error returned by a listener callback.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ListenerError {
    /// Create a listener error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error.
    pub fn from_source(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Self {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Extension trait for adding context to `Result` types.
///
/// # Example
///
/// ```rust
/// use inspectkit_core::error::{InspectError, InspectResultExt};
///
/// fn attach() -> Result<(), InspectError> {
///     let result: Result<(), InspectError> = Err(InspectError::NotOpen);
///     result.context("while attaching the debugger")?;
///     Ok(())
/// }
///
/// assert!(attach().unwrap_err().to_string().contains("while attaching"));
/// ```
pub trait InspectResultExt<T> {
    /// Add context to an error.
    fn context<C: Into<String>>(self, context: C) -> Result<T, InspectError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<C, F>(self, f: F) -> Result<T, InspectError>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> InspectResultExt<T> for Result<T, InspectError> {
    fn context<C: Into<String>>(self, context: C) -> Self {
        self.map_err(|e| InspectError::WithContext {
            context: context.into(),
            source: Box::new(e),
        })
    }

    fn with_context<C, F>(self, f: F) -> Self
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| InspectError::WithContext {
            context: f().into(),
            source: Box::new(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_classification() {
        assert!(InspectError::NotConnected.is_lifecycle());
        assert!(InspectError::AlreadyOpen {
            url: "ws=127.0.0.1:9229/x".to_string()
        }
        .is_lifecycle());
        assert!(!InspectError::transport(TransportErrorKind::Io, "boom").is_lifecycle());
    }

    #[test]
    fn test_context_preserves_kind() {
        let result: Result<(), InspectError> =
            Err(InspectError::transport(TransportErrorKind::BindFailed, "port in use"));
        let err = result.context("opening inspector").unwrap_err();

        assert_eq!(err.transport_kind(), Some(TransportErrorKind::BindFailed));
        assert!(err.to_string().starts_with("opening inspector: "));
    }

    #[test]
    fn test_listener_error_display() {
        let io = std::io::Error::other("disk full");
        let err = ListenerError::from_source(io);
        assert_eq!(err.message(), "disk full");

        let wrapped = InspectError::Listener {
            event: "evt_a".to_string(),
            source: ListenerError::new("bad input"),
        };
        assert_eq!(wrapped.to_string(), "Listener for 'evt_a' failed: bad input");
    }

    #[test]
    fn test_already_open_mentions_url() {
        let err = InspectError::AlreadyOpen {
            url: "ws=localhost:9229/abc".to_string(),
        };
        assert!(err.to_string().contains("ws=localhost:9229/abc"));
    }
}
