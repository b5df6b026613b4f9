//! Endpoint, backend and output abstractions for inspectkit.
//!
//! A debugging session needs three things it does not implement itself:
//! somewhere to listen, a debugger to talk to, and somewhere to print. This
//! crate defines those seams and ships the implementations inspectkit uses
//! out of the box.
//!
//! # Available Implementations
//!
//! | Type | Role |
//! |------|------|
//! | [`TcpEndpoint`] | Binds a TCP listener and mints a session token |
//! | [`MemoryBackend`] | In-process backend fed by the host's debugger thread |
//! | [`SharedOutput`] | Line-oriented output over any `io::Write` |
//!
//! Notifications travel from backend to session through a
//! [`notification_channel`]: the backend holds the cloneable
//! [`NotificationSink`], the connected session owns the
//! [`NotificationQueue`].

#![deny(missing_docs)]

pub mod channel;
pub mod error;
pub mod memory;
pub mod output;
pub mod tcp;
pub mod traits;

// Re-export commonly used types
pub use channel::{notification_channel, NotificationQueue, NotificationSink};
pub use error::TransportError;
pub use memory::{CommandHandler, MemoryBackend};
pub use output::SharedOutput;
pub use tcp::{TcpEndpoint, TcpListening};
pub use traits::{DebuggerBackend, InspectorEndpoint, ListeningEndpoint, OutputSink};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::channel::{notification_channel, NotificationQueue, NotificationSink};
    pub use crate::error::TransportError;
    pub use crate::memory::MemoryBackend;
    pub use crate::output::SharedOutput;
    pub use crate::tcp::TcpEndpoint;
    pub use crate::traits::{DebuggerBackend, InspectorEndpoint, ListeningEndpoint, OutputSink};
}
