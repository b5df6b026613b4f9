//! Inspector configuration.

use inspectkit_core::emitter::DEFAULT_MAX_LISTENERS;
use inspectkit_core::error::InspectError;
use serde::{Deserialize, Serialize};

/// Default host an inspector binds to.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default inspector port.
pub const DEFAULT_PORT: u16 = 9229;

/// Default prefix of the DevTools link printed in the banner.
pub const DEFAULT_DEVTOOLS_PREFIX: &str = "devtools://devtools/bundled/js_app.html?";

/// Configuration shared by every session an inspector creates.
///
/// Every field has a default, so a partial JSON document is a valid
/// configuration.
///
/// # Example
///
/// ```
/// use inspectkit_session::InspectorConfig;
///
/// let config = InspectorConfig::from_json(r#"{"default_port": 9230}"#).unwrap();
/// assert_eq!(config.default_port, 9230);
/// assert_eq!(config.default_host, "127.0.0.1");
///
/// let config = InspectorConfig::new()
///     .with_default_host("0.0.0.0")
///     .with_print_banner(false);
/// assert!(!config.print_banner);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Host used by `Session::open_default`.
    pub default_host: String,
    /// Port used by `Session::open_default` (0 = any free port).
    pub default_port: u16,
    /// Per-event listener count above which a leak warning is logged
    /// (0 = never warn).
    pub max_listeners: usize,
    /// Whether `open` writes the banner to the output sink.
    pub print_banner: bool,
    /// Prefix of the DevTools link on the banner's second line.
    pub devtools_prefix: String,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl InspectorConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_host: DEFAULT_HOST.to_string(),
            default_port: DEFAULT_PORT,
            max_listeners: DEFAULT_MAX_LISTENERS,
            print_banner: true,
            devtools_prefix: DEFAULT_DEVTOOLS_PREFIX.to_string(),
        }
    }

    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, InspectError> {
        serde_json::from_str(json)
            .map_err(|e| InspectError::config("failed to parse inspector configuration", e))
    }

    /// Set the default host.
    #[must_use]
    pub fn with_default_host(mut self, host: impl Into<String>) -> Self {
        self.default_host = host.into();
        self
    }

    /// Set the default port.
    #[must_use]
    pub const fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    /// Set the leak warning threshold.
    #[must_use]
    pub const fn with_max_listeners(mut self, max: usize) -> Self {
        self.max_listeners = max;
        self
    }

    /// Enable or disable the banner.
    #[must_use]
    pub const fn with_print_banner(mut self, print: bool) -> Self {
        self.print_banner = print;
        self
    }

    /// Set the DevTools link prefix.
    #[must_use]
    pub fn with_devtools_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.devtools_prefix = prefix.into();
        self
    }
}
