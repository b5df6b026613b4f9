//! Test fixtures for inspectkit testing.
//!
//! Listeners in these fixtures record what they see into a
//! [`CapturedOutput`], so a test can compare the whole transcript at once.

use inspectkit_core::emitter::Listener;
use inspectkit_core::error::ListenerError;
use inspectkit_transport::error::TransportError;
use inspectkit_transport::traits::OutputSink;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

/// An [`OutputSink`] that keeps every line in memory.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CapturedOutput {
    /// Create an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a line.
    pub fn push(&self, line: impl Into<String>) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.into());
    }

    /// Every line recorded so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Return and forget every line recorded so far.
    #[must_use]
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl OutputSink for CapturedOutput {
    fn write_line(&self, line: &str) -> Result<(), TransportError> {
        self.push(line);
        Ok(())
    }
}

/// Render a listener argument the way a script would print it: strings
/// bare, everything else as JSON.
#[must_use]
pub fn display_arg(arg: &Value) -> String {
    match arg {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A listener recording `"<name>: <first arg>"`.
#[must_use]
pub fn printing_listener(output: &CapturedOutput, name: &str) -> Listener {
    let output = output.clone();
    let name = name.to_string();
    Listener::infallible(move |args| {
        let arg = args.first().map(display_arg).unwrap_or_default();
        output.push(format!("{name}: {arg}"));
    })
}

/// A listener recording `"<prefix>: <first arg's method>"`, for
/// notification channels.
#[must_use]
pub fn method_listener(output: &CapturedOutput, prefix: &str) -> Listener {
    let output = output.clone();
    let prefix = prefix.to_string();
    Listener::infallible(move |args| {
        let method = args
            .first()
            .and_then(|arg| arg.get("method"))
            .map(display_arg)
            .unwrap_or_default();
        output.push(format!("{prefix}: {method}"));
    })
}

/// A listener that always fails with `message`.
#[must_use]
pub fn failing_listener(message: &str) -> Listener {
    let message = message.to_string();
    Listener::new(move |_| Err(ListenerError::new(message.clone())))
}

/// Script URLs a [`ScriptedBackend`](crate::mock::ScriptedBackend) reports
/// by default.
#[must_use]
pub fn sample_scripts() -> Vec<String> {
    vec![
        "file:///workspace/main.js".to_string(),
        "file:///workspace/lib/util.js".to_string(),
    ]
}
