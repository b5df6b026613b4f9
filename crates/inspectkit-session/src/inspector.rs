//! The inspector instrument and its builder.
//!
//! An [`Inspector`] is what a host hands to scripts: it bundles the
//! configuration and the three collaborators every [`Session`] needs, and
//! creates sessions sharing them.
//!
//! # Example
//!
//! ```rust
//! use inspectkit_session::{Inspector, InspectorConfig};
//! use inspectkit_transport::{MemoryBackend, SharedOutput};
//!
//! let inspector = Inspector::builder()
//!     .config(InspectorConfig::new().with_print_banner(false))
//!     .backend(MemoryBackend::new())
//!     .output(SharedOutput::sink())
//!     .build();
//!
//! let mut session = inspector.session();
//! session.open(0, "127.0.0.1").unwrap();
//! assert!(session.url().unwrap().starts_with("ws=127.0.0.1:"));
//! ```

use crate::config::InspectorConfig;
use crate::session::Session;
use inspectkit_transport::memory::MemoryBackend;
use inspectkit_transport::output::SharedOutput;
use inspectkit_transport::tcp::TcpEndpoint;
use inspectkit_transport::traits::{DebuggerBackend, InspectorEndpoint, OutputSink};
use std::fmt;
use std::sync::Arc;

struct Shared {
    config: InspectorConfig,
    endpoint: Arc<dyn InspectorEndpoint>,
    backend: Arc<dyn DebuggerBackend>,
    output: Arc<dyn OutputSink>,
}

/// Factory for debugging sessions.
///
/// Cloning is cheap; clones share configuration and collaborators.
#[derive(Clone)]
pub struct Inspector {
    shared: Arc<Shared>,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Inspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inspector")
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl Inspector {
    /// Start building an inspector.
    #[must_use]
    pub fn builder() -> InspectorBuilder {
        InspectorBuilder::new()
    }

    /// Create a new, closed session.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(self)
    }

    /// The configuration shared by this inspector's sessions.
    #[must_use]
    pub fn config(&self) -> &InspectorConfig {
        &self.shared.config
    }

    pub(crate) fn endpoint(&self) -> &dyn InspectorEndpoint {
        self.shared.endpoint.as_ref()
    }

    pub(crate) fn backend(&self) -> &dyn DebuggerBackend {
        self.shared.backend.as_ref()
    }

    pub(crate) fn output(&self) -> &dyn OutputSink {
        self.shared.output.as_ref()
    }
}

/// Builder for [`Inspector`].
///
/// Unset collaborators default to a [`TcpEndpoint`], an empty
/// [`MemoryBackend`] and standard output.
#[derive(Default)]
pub struct InspectorBuilder {
    config: Option<InspectorConfig>,
    endpoint: Option<Arc<dyn InspectorEndpoint>>,
    backend: Option<Arc<dyn DebuggerBackend>>,
    output: Option<Arc<dyn OutputSink>>,
}

impl fmt::Debug for InspectorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InspectorBuilder")
            .field("config", &self.config)
            .field("has_endpoint", &self.endpoint.is_some())
            .field("has_backend", &self.backend.is_some())
            .field("has_output", &self.output.is_some())
            .finish()
    }
}

impl InspectorBuilder {
    /// Create a builder with nothing set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration.
    #[must_use]
    pub fn config(mut self, config: InspectorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the endpoint factory used by `Session::open`.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl InspectorEndpoint + 'static) -> Self {
        self.endpoint = Some(Arc::new(endpoint));
        self
    }

    /// Set the debugger backend sessions connect to.
    #[must_use]
    pub fn backend(mut self, backend: impl DebuggerBackend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    /// Set where banners are written.
    #[must_use]
    pub fn output(mut self, output: impl OutputSink + 'static) -> Self {
        self.output = Some(Arc::new(output));
        self
    }

    /// Build the inspector.
    #[must_use]
    pub fn build(self) -> Inspector {
        let config = self.config.unwrap_or_default();
        tracing::debug!(
            host = %config.default_host,
            port = config.default_port,
            max_listeners = config.max_listeners,
            "Building inspector"
        );
        let endpoint: Arc<dyn InspectorEndpoint> = match self.endpoint {
            Some(endpoint) => endpoint,
            None => Arc::new(TcpEndpoint::new()),
        };
        let backend: Arc<dyn DebuggerBackend> = match self.backend {
            Some(backend) => backend,
            None => Arc::new(MemoryBackend::new()),
        };
        let output: Arc<dyn OutputSink> = match self.output {
            Some(output) => output,
            None => Arc::new(SharedOutput::stdout()),
        };
        Inspector {
            shared: Arc::new(Shared {
                config,
                endpoint,
                backend,
                output,
            }),
        }
    }
}
