//! Output sinks for inspector banners.
//!
//! The inspector never prints to the process's stdout directly; it writes
//! through an [`OutputSink`] chosen by the embedding host.

use crate::error::TransportError;
use crate::traits::OutputSink;
use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// An [`OutputSink`] over any `io::Write`, shareable between sessions.
#[derive(Clone)]
pub struct SharedOutput {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl SharedOutput {
    /// Wrap a writer.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Write to the process's standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Write to the process's standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }

    /// Discard everything.
    #[must_use]
    pub fn sink() -> Self {
        Self::new(std::io::sink())
    }
}

impl fmt::Debug for SharedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedOutput").finish_non_exhaustive()
    }
}

impl OutputSink for SharedOutput {
    fn write_line(&self, line: &str) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}
