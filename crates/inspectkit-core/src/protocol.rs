//! Debugger protocol message types.
//!
//! The inspector speaks a JSON protocol in which the client posts
//! **commands** (`{"id": 1, "method": "Debugger.enable"}`) and the backend
//! streams **notifications** (`{"method": "Debugger.paused", "params": {...}}`).
//! Only the envelope is modelled here; method vocabularies belong to the
//! backend.
//!
//! # Example
//!
//! ```rust
//! use inspectkit_core::protocol::{methods, Notification};
//!
//! let paused = Notification::with_params(
//!     methods::PAUSED,
//!     serde_json::json!({"reason": "other"}),
//! );
//! assert_eq!(paused.domain(), Some("Debugger"));
//! assert_eq!(paused.to_value()["method"], "Debugger.paused");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Name of the catch-all channel every notification is also emitted under.
pub const INSPECTOR_NOTIFICATION: &str = "inspectorNotification";

/// Well-known method names.
pub mod methods {
    /// Notification: a script was parsed by the backend.
    pub const SCRIPT_PARSED: &str = "Debugger.scriptParsed";
    /// Notification: execution paused.
    pub const PAUSED: &str = "Debugger.paused";
    /// Notification: execution resumed.
    pub const RESUMED: &str = "Debugger.resumed";
    /// Command: enable the debugger domain.
    pub const ENABLE: &str = "Debugger.enable";
    /// Command: disable the debugger domain.
    pub const DISABLE: &str = "Debugger.disable";
}

/// Identifier of a posted command.
///
/// Ids are assigned per session, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(pub u64);

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CommandId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A command posted by a session to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// The command ID, echoed by the backend's response.
    pub id: CommandId,
    /// The method to invoke.
    pub method: Cow<'static, str>,
    /// The method parameters, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Command {
    /// Create a new command with no parameters.
    #[must_use]
    pub fn new(id: impl Into<CommandId>, method: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: id.into(),
            method: method.into(),
            params: None,
        }
    }

    /// Set the parameters for this command.
    #[must_use]
    pub fn params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Get the method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}

/// A one-way notification streamed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// The notification method, e.g. `Debugger.paused`.
    pub method: Cow<'static, str>,
    /// The notification parameters, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Notification {
    /// Create a new notification with no parameters.
    #[must_use]
    pub fn new(method: impl Into<Cow<'static, str>>) -> Self {
        Self {
            method: method.into(),
            params: None,
        }
    }

    /// Create a new notification with parameters.
    #[must_use]
    pub fn with_params(method: impl Into<Cow<'static, str>>, params: Value) -> Self {
        Self {
            method: method.into(),
            params: Some(params),
        }
    }

    /// Get the method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The protocol domain, i.e. the part of the method before the first dot.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.method.split_once('.').map(|(domain, _)| domain)
    }

    /// The payload handed to listeners: an object with `method` and, when
    /// present, `params`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("method".to_string(), Value::String(self.method.to_string()));
        if let Some(params) = &self.params {
            object.insert("params".to_string(), params.clone());
        }
        Value::Object(object)
    }
}
