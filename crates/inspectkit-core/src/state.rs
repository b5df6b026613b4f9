//! Session lifecycle state.
//!
//! ```text
//!            open               connect
//! Closed ───────────▶ Open ───────────────▶ Connected
//!   ▲                 │  ▲                     │
//!   │      close      │  │     disconnect      │
//!   └─────────────────┘  └─────────────────────┘
//!   ▲                                          │
//!   └──────────────────── close ───────────────┘
//! ```
//!
//! The transition methods here only validate and compute the next state;
//! acquiring and releasing resources is the session's job.

use crate::error::InspectError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No endpoint is listening.
    #[default]
    Closed,
    /// An endpoint is listening; notifications are not forwarded.
    Open,
    /// Notifications are forwarded and commands may be posted.
    Connected,
}

impl SessionState {
    /// Whether an endpoint is currently held (Open or Connected).
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Whether the session is connected.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Validate `connect` and return the next state.
    pub fn connect(self) -> Result<Self, InspectError> {
        match self {
            Self::Closed => Err(InspectError::NotOpen),
            Self::Open => Ok(Self::Connected),
            Self::Connected => Err(InspectError::AlreadyConnected),
        }
    }

    /// The state after `disconnect`; a no-op unless connected.
    #[must_use]
    pub const fn disconnect(self) -> Self {
        match self {
            Self::Connected => Self::Open,
            other => other,
        }
    }

    /// Check that commands may be posted.
    pub fn ensure_connected(self) -> Result<(), InspectError> {
        match self {
            Self::Connected => Ok(()),
            _ => Err(InspectError::NotConnected),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Where a listening inspector endpoint can be reached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// Host the endpoint is bound to.
    pub host: String,
    /// Port the endpoint is bound to.
    pub port: u16,
    /// Opaque session token, the path component of the URL.
    pub token: String,
}

impl EndpointDescriptor {
    /// Create a new descriptor.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            token: token.into(),
        }
    }

    /// The `host:port` authority; IPv6 hosts are bracketed.
    #[must_use]
    pub fn authority(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// The session URL token: `ws=<host>:<port>/<token>`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("ws={}/{}", self.authority(), self.token)
    }
}

impl fmt::Display for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}
