//! Testing utilities for inspectkit.
//!
//! This crate provides a simulated debugger, output capture and assertions
//! for testing debugging sessions:
//!
//! - [`ScriptedBackend`] replays script loading and `debugger;` statements
//! - [`CapturedOutput`] records banners and listener output in memory
//! - recording listener helpers and transcript assertions
//!
//! # Example
//!
//! ```rust
//! use inspectkit_core::EventEmitter;
//! use inspectkit_testing::{assert_lines, printing_listener, CapturedOutput};
//! use serde_json::json;
//!
//! let output = CapturedOutput::new();
//! let emitter = EventEmitter::new();
//! emitter.on("A", printing_listener(&output, "l1"));
//! emitter.emit("A", &[json!("A")]).unwrap();
//!
//! assert_lines!(output, ["l1: A"]);
//! ```

#![deny(missing_docs)]

pub mod assertions;
pub mod fixtures;
pub mod mock;

// Re-export commonly used types
pub use assertions::{assert_banner, assert_output_lines, assert_session_url};
pub use fixtures::{
    display_arg, failing_listener, method_listener, printing_listener, sample_scripts,
    CapturedOutput,
};
pub use mock::ScriptedBackend;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::assert_lines;
    pub use crate::assertions::{assert_banner, assert_output_lines, assert_session_url};
    pub use crate::fixtures::{failing_listener, method_listener, printing_listener, CapturedOutput};
    pub use crate::mock::ScriptedBackend;
}
