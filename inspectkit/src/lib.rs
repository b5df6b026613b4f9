//! # inspectkit - embeddable debugger inspector sessions
//!
//! inspectkit gives a script host the `inspector` surface scripts expect:
//! a [`Session`] that opens a network-reachable endpoint, connects to the
//! host's debugger, and delivers debugger notifications to event listeners.
//!
//! ## Features
//!
//! - **Ordered listener registry** with append, prepend and one-shot
//!   registration, safe against mutation from inside listeners
//! - **Explicit lifecycle**: Closed, Open and Connected, with typed errors
//!   for out-of-order calls
//! - **Thread-safe delivery**: backends push notifications from any thread,
//!   the session owner dispatches them
//! - **Rich error handling** with context chains and miette diagnostics
//!
//! ## Quick Start
//!
//! ```rust
//! use inspectkit::prelude::*;
//! use inspectkit::transport::{MemoryBackend, SharedOutput};
//!
//! # fn main() -> Result<(), InspectError> {
//! let backend = MemoryBackend::new();
//! let inspector = Inspector::builder()
//!     .backend(backend.clone())
//!     .output(SharedOutput::sink())
//!     .build();
//!
//! let mut session = inspector.session();
//! session.on(methods::PAUSED, Listener::infallible(|args| {
//!     println!("paused: {}", args[0]["params"]);
//! }));
//!
//! session.open(0, "127.0.0.1")?;
//! session.connect()?;
//! session.post(methods::ENABLE, None)?;
//!
//! backend.notify(&Notification::new(methods::PAUSED));
//! assert_eq!(session.dispatch_pending()?, 1);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

// Re-export all public items from core
pub use inspectkit_core::*;

// Re-export session types
pub use inspectkit_session::{Inspector, InspectorBuilder, InspectorConfig, Session};

pub mod prelude;

/// Session module re-exports
pub mod session {
    //! Session, inspector and configuration types.
    pub use inspectkit_session::*;
}

/// Transport module re-exports
pub mod transport {
    //! Endpoint, backend and output types.
    pub use inspectkit_transport::*;
}
