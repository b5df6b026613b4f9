//! Prelude module for convenient imports.
//!
//! ```rust
//! use inspectkit::prelude::*;
//! ```

pub use inspectkit_core::prelude::*;
pub use inspectkit_session::{Inspector, InspectorBuilder, InspectorConfig, Session};
pub use inspectkit_transport::{DebuggerBackend, InspectorEndpoint, OutputSink};
