//! # inspectkit-core
//!
//! Core types for the inspectkit debugging session library.
//!
//! This crate provides the building blocks the other inspectkit crates share:
//!
//! - **Protocol types**: debugger commands and notifications
//! - **Event emitter**: ordered, mutation-safe listener registry with
//!   synchronous dispatch
//! - **Session state**: the Closed / Open / Connected lifecycle and endpoint
//!   descriptors
//! - **Error handling**: unified `InspectError` type with miette diagnostics
//!
//! This crate is runtime-agnostic and does not depend on any async runtime.
//!
//! # Example
//!
//! ```rust
//! use inspectkit_core::prelude::*;
//!
//! let emitter = EventEmitter::new();
//! emitter.once(methods::PAUSED, Listener::infallible(|args| {
//!     assert_eq!(args[0]["method"], "Debugger.paused");
//! }));
//!
//! let paused = Notification::new(methods::PAUSED);
//! assert!(emitter.emit(paused.method(), &[paused.to_value()]).unwrap());
//! assert_eq!(emitter.listener_count(None), 0);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod emitter;
pub mod error;
pub mod protocol;
pub mod state;

// Re-export commonly used types at the crate root
pub use emitter::{EventEmitter, Listener, ListenerId, DEFAULT_MAX_LISTENERS};
pub use error::{InspectError, InspectResultExt, ListenerError, TransportErrorKind};
pub use protocol::{methods, Command, CommandId, Notification, INSPECTOR_NOTIFICATION};
pub use state::{EndpointDescriptor, SessionState};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use inspectkit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::emitter::{EventEmitter, Listener, ListenerId};
    pub use crate::error::{InspectError, InspectResultExt, ListenerError};
    pub use crate::protocol::{methods, Command, CommandId, Notification, INSPECTOR_NOTIFICATION};
    pub use crate::state::{EndpointDescriptor, SessionState};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let _emitter = EventEmitter::new();
        let _state = SessionState::default();
        let _command = Command::new(1u64, methods::ENABLE);
    }

    #[test]
    fn test_catch_all_channel_name() {
        assert_eq!(INSPECTOR_NOTIFICATION, "inspectorNotification");
    }
}
