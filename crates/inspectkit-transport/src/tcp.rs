//! TCP inspector endpoint.
//!
//! [`TcpEndpoint`] binds a TCP listener so that the advertised port is
//! really reserved for the inspector. Framing debugger traffic on accepted
//! connections is the job of the embedding transport.
//!
//! # Example
//!
//! ```rust
//! use inspectkit_transport::{InspectorEndpoint, TcpEndpoint};
//!
//! let endpoint = TcpEndpoint::new();
//! let listening = endpoint.listen("127.0.0.1", 0).unwrap();
//!
//! let descriptor = listening.descriptor().clone();
//! assert_ne!(descriptor.port, 0);
//! assert!(descriptor.url().starts_with("ws=127.0.0.1:"));
//!
//! listening.shutdown();
//! ```

use crate::error::TransportError;
use crate::traits::{InspectorEndpoint, ListeningEndpoint};
use inspectkit_core::state::EndpointDescriptor;
use std::net::TcpListener;

/// Endpoint factory binding TCP listeners.
#[derive(Debug, Clone, Default)]
pub struct TcpEndpoint {
    token_prefix: Option<String>,
}

impl TcpEndpoint {
    /// Create a new TCP endpoint factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix every minted session token with `prefix`.
    #[must_use]
    pub fn with_token_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.token_prefix = Some(prefix.into());
        self
    }

    fn mint_token(&self) -> String {
        let id = uuid::Uuid::new_v4();
        match &self.token_prefix {
            Some(prefix) => format!("{prefix}{id}"),
            None => id.to_string(),
        }
    }
}

impl InspectorEndpoint for TcpEndpoint {
    fn listen(&self, host: &str, port: u16) -> Result<Box<dyn ListeningEndpoint>, TransportError> {
        let listener = TcpListener::bind((host, port)).map_err(|source| TransportError::Bind {
            addr: format!("{host}:{port}"),
            source,
        })?;
        let bound = listener.local_addr()?.port();
        let descriptor = EndpointDescriptor::new(host, bound, self.mint_token());

        tracing::info!(host, port = bound, url = %descriptor.url(), "Inspector endpoint listening");

        Ok(Box::new(TcpListening {
            listener,
            descriptor,
        }))
    }
}

/// A bound TCP inspector endpoint.
#[derive(Debug)]
pub struct TcpListening {
    listener: TcpListener,
    descriptor: EndpointDescriptor,
}

impl TcpListening {
    /// The underlying listener, for a transport that accepts connections.
    #[must_use]
    pub fn listener(&self) -> &TcpListener {
        &self.listener
    }
}

impl ListeningEndpoint for TcpListening {
    fn descriptor(&self) -> &EndpointDescriptor {
        &self.descriptor
    }

    fn shutdown(self: Box<Self>) {
        tracing::info!(url = %self.descriptor.url(), "Inspector endpoint closed");
        drop(self.listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ephemeral_port_is_reported() {
        let listening = TcpEndpoint::new().listen("127.0.0.1", 0).unwrap();
        let descriptor = listening.descriptor();

        assert_ne!(descriptor.port, 0);
        assert!(descriptor.url().contains(&format!(":{}/", descriptor.port)));
    }

    #[test]
    fn test_port_is_reserved_until_shutdown() {
        let endpoint = TcpEndpoint::new();
        let first = endpoint.listen("127.0.0.1", 0).unwrap();
        let port = first.descriptor().port;

        let err = endpoint.listen("127.0.0.1", port).unwrap_err();
        assert!(matches!(err, TransportError::Bind { .. }));

        first.shutdown();
        let second = endpoint.listen("127.0.0.1", port).unwrap();
        assert_eq!(second.descriptor().port, port);
    }

    #[test]
    fn test_tokens_are_unique_and_prefixed() {
        let endpoint = TcpEndpoint::new().with_token_prefix("insp-");
        let a = endpoint.listen("127.0.0.1", 0).unwrap();
        let b = endpoint.listen("127.0.0.1", 0).unwrap();

        assert!(a.descriptor().token.starts_with("insp-"));
        assert_ne!(a.descriptor().token, b.descriptor().token);
    }
}
