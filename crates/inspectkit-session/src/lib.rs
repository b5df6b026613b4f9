//! Debugging sessions for inspectkit.
//!
//! This crate ties the core emitter and the transport collaborators
//! together:
//!
//! - [`Inspector`] and [`InspectorBuilder`]: the instrument a host exposes,
//!   holding configuration, endpoint factory, backend and output
//! - [`Session`]: open/close an endpoint, connect to the backend, post
//!   commands and fan notifications out to listeners
//! - [`InspectorConfig`]: serde-backed configuration
//!
//! # Example
//!
//! ```rust
//! use inspectkit_session::prelude::*;
//! use inspectkit_transport::SharedOutput;
//!
//! let inspector = Inspector::builder().output(SharedOutput::sink()).build();
//! let mut session = inspector.session();
//!
//! assert!(session.url().is_none());
//! session.open(0, "127.0.0.1").unwrap();
//! session.connect().unwrap();
//! assert!(session.state().is_connected());
//!
//! session.close();
//! assert!(session.url().is_none());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::return_self_not_must_use)]

pub mod banner;
pub mod config;
pub mod inspector;
pub mod session;

// Re-export commonly used types
pub use config::InspectorConfig;
pub use inspector::{Inspector, InspectorBuilder};
pub use session::Session;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::InspectorConfig;
    pub use crate::inspector::{Inspector, InspectorBuilder};
    pub use crate::session::Session;
    pub use inspectkit_core::prelude::*;
}
