//! Collaborator traits.
//!
//! A session depends on three collaborators it does not implement itself:
//!
//! - an [`InspectorEndpoint`] that binds a network endpoint and mints the
//!   session URL token,
//! - a [`DebuggerBackend`] that accepts commands and streams notifications,
//! - an [`OutputSink`] that receives the human-readable banner.
//!
//! All three are object-safe and `Send + Sync` so that one instance can be
//! shared by every session an inspector creates.

use crate::channel::NotificationSink;
use crate::error::TransportError;
use inspectkit_core::protocol::Command;
use inspectkit_core::state::EndpointDescriptor;

/// Allocates listening inspector endpoints.
pub trait InspectorEndpoint: Send + Sync {
    /// Bind `host:port` and start listening.
    ///
    /// Port `0` asks the endpoint to pick a free port; the returned
    /// descriptor reports the port actually bound.
    fn listen(&self, host: &str, port: u16) -> Result<Box<dyn ListeningEndpoint>, TransportError>;
}

/// A bound, listening endpoint. Dropping it stops listening.
pub trait ListeningEndpoint: Send + Sync + std::fmt::Debug {
    /// Where this endpoint can be reached.
    fn descriptor(&self) -> &EndpointDescriptor;

    /// Stop listening and release the socket.
    fn shutdown(self: Box<Self>);
}

/// The debugger a session talks to.
pub trait DebuggerBackend: Send + Sync {
    /// Start delivering notifications for `session` into `sink`.
    fn attach(&self, session: &str, sink: NotificationSink) -> Result<(), TransportError>;

    /// Stop delivering notifications for `session`. Detaching an unknown
    /// session is a no-op.
    fn detach(&self, session: &str);

    /// Handle a command posted by an attached session.
    fn handle_command(&self, session: &str, command: &Command) -> Result<(), TransportError>;
}

/// Destination for human-readable inspector output.
pub trait OutputSink: Send + Sync {
    /// Write one line of text; the sink appends the line terminator.
    fn write_line(&self, line: &str) -> Result<(), TransportError>;
}
