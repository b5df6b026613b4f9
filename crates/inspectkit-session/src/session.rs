//! Debugging sessions.
//!
//! A [`Session`] is the object scripts hold: it carries its own
//! [`EventEmitter`], owns the listening endpoint while open, and forwards
//! debugger notifications to listeners while connected.
//!
//! # Notification fan-out
//!
//! Backend notifications queue up until the owner calls
//! [`Session::dispatch_pending`]. Each notification is emitted first under
//! its method name and then under [`INSPECTOR_NOTIFICATION`]; both receive
//! the same `{"method", "params"}` object.
//!
//! # Example
//!
//! ```rust
//! use inspectkit_core::prelude::*;
//! use inspectkit_session::{Inspector, InspectorConfig};
//! use inspectkit_transport::{MemoryBackend, SharedOutput};
//! use std::sync::{Arc, Mutex};
//!
//! let backend = MemoryBackend::new();
//! let inspector = Inspector::builder()
//!     .backend(backend.clone())
//!     .output(SharedOutput::sink())
//!     .build();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let mut session = inspector.session();
//! let record = Arc::clone(&seen);
//! session.on(INSPECTOR_NOTIFICATION, Listener::infallible(move |args| {
//!     record.lock().unwrap().push(args[0]["method"].to_string());
//! }));
//!
//! session.open(0, "127.0.0.1").unwrap();
//! session.connect().unwrap();
//! backend.notify(&Notification::new(methods::PAUSED));
//!
//! assert_eq!(session.dispatch_pending().unwrap(), 1);
//! assert_eq!(*seen.lock().unwrap(), vec!["\"Debugger.paused\""]);
//! ```

use crate::banner;
use crate::inspector::Inspector;
use inspectkit_core::emitter::{EventEmitter, Listener};
use inspectkit_core::error::{InspectError, InspectResultExt};
use inspectkit_core::protocol::{Command, CommandId, Notification, INSPECTOR_NOTIFICATION};
use inspectkit_core::state::{EndpointDescriptor, SessionState};
use inspectkit_transport::channel::{notification_channel, NotificationQueue};
use inspectkit_transport::traits::ListeningEndpoint;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A debugging session bound to an [`Inspector`].
pub struct Session {
    id: String,
    inspector: Inspector,
    state: SessionState,
    emitter: Arc<EventEmitter>,
    endpoint: Option<Box<dyn ListeningEndpoint>>,
    queue: Option<NotificationQueue>,
    next_command_id: u64,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("endpoint", &self.endpoint())
            .field("emitter", &self.emitter)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a closed session using `inspector`'s collaborators.
    #[must_use]
    pub fn new(inspector: &Inspector) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(session = %id, "Session created");
        Self {
            id,
            inspector: inspector.clone(),
            state: SessionState::Closed,
            emitter: Arc::new(EventEmitter::with_max_listeners(
                inspector.config().max_listeners,
            )),
            endpoint: None,
            queue: None,
            next_command_id: 1,
        }
    }

    /// This session's unique id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Where the session is listening, if open.
    #[must_use]
    pub fn endpoint(&self) -> Option<&EndpointDescriptor> {
        self.endpoint.as_ref().map(|endpoint| endpoint.descriptor())
    }

    /// The session URL, `ws=<host>:<port>/<token>`, while open.
    #[must_use]
    pub fn url(&self) -> Option<String> {
        self.endpoint().map(EndpointDescriptor::url)
    }

    /// A shared handle to this session's emitter.
    ///
    /// Listeners that need to register or remove listeners while a
    /// notification is being dispatched capture this handle.
    #[must_use]
    pub fn emitter(&self) -> Arc<EventEmitter> {
        Arc::clone(&self.emitter)
    }

    // ---- Lifecycle ----

    /// Start listening on `host:port` (port 0 picks a free port).
    ///
    /// Writes the banner to the inspector's output unless disabled in the
    /// configuration. Fails with [`InspectError::AlreadyOpen`] when the
    /// session is already open, leaving it untouched.
    pub fn open(&mut self, port: u16, host: &str) -> Result<EndpointDescriptor, InspectError> {
        if let Some(url) = self.url() {
            return Err(InspectError::AlreadyOpen { url });
        }

        let endpoint = self
            .inspector
            .endpoint()
            .listen(host, port)
            .map_err(InspectError::from)
            .with_context(|| format!("opening inspector on {host}:{port}"))?;
        let descriptor = endpoint.descriptor().clone();

        if self.inspector.config().print_banner {
            if let Err(err) = self.print_banner(&descriptor) {
                endpoint.shutdown();
                return Err(err);
            }
        }

        tracing::info!(session = %self.id, url = %descriptor.url(), "Session opened");
        self.endpoint = Some(endpoint);
        self.state = SessionState::Open;
        Ok(descriptor)
    }

    /// Open on the configured default host and port.
    pub fn open_default(&mut self) -> Result<EndpointDescriptor, InspectError> {
        let config = self.inspector.config();
        let (host, port) = (config.default_host.clone(), config.default_port);
        self.open(port, &host)
    }

    fn print_banner(&self, descriptor: &EndpointDescriptor) -> Result<(), InspectError> {
        let output = self.inspector.output();
        for line in banner::render(self.inspector.config(), descriptor) {
            output
                .write_line(&line)
                .map_err(InspectError::from)
                .context("writing inspector banner")?;
        }
        Ok(())
    }

    /// Stop listening. Disconnects first when connected; a no-op when
    /// already closed.
    pub fn close(&mut self) {
        self.disconnect();
        if let Some(endpoint) = self.endpoint.take() {
            let url = endpoint.descriptor().url();
            endpoint.shutdown();
            tracing::info!(session = %self.id, url = %url, "Session closed");
        }
        self.state = SessionState::Closed;
    }

    /// Attach to the debugger backend and start queueing notifications.
    ///
    /// The session must be opened first; connecting a closed session fails
    /// with [`InspectError::NotOpen`].
    pub fn connect(&mut self) -> Result<(), InspectError> {
        let next = self.state.connect()?;

        let (sink, queue) = notification_channel();
        self.inspector
            .backend()
            .attach(&self.id, sink)
            .map_err(InspectError::from)?;

        self.queue = Some(queue);
        self.state = next;
        tracing::info!(session = %self.id, "Session connected");
        Ok(())
    }

    /// Detach from the backend. Undelivered notifications are discarded;
    /// a no-op unless connected.
    pub fn disconnect(&mut self) {
        if !self.state.is_connected() {
            return;
        }

        self.inspector.backend().detach(&self.id);
        if let Some(mut queue) = self.queue.take() {
            let discarded = queue.close();
            if !discarded.is_empty() {
                tracing::warn!(
                    session = %self.id,
                    discarded = discarded.len(),
                    "Discarding undelivered notifications on disconnect"
                );
            }
        }
        self.state = self.state.disconnect();
        tracing::info!(session = %self.id, "Session disconnected");
    }

    /// Post a command to the debugger backend.
    ///
    /// Only allowed while connected. Returns the id assigned to the
    /// command.
    pub fn post(
        &mut self,
        method: impl Into<Cow<'static, str>>,
        params: Option<Value>,
    ) -> Result<CommandId, InspectError> {
        self.state.ensure_connected()?;

        let id = CommandId(self.next_command_id);
        let mut command = Command::new(id, method);
        if let Some(params) = params {
            command = command.params(params);
        }

        self.inspector
            .backend()
            .handle_command(&self.id, &command)
            .map_err(InspectError::from)
            .with_context(|| format!("posting {}", command.method()))?;

        self.next_command_id += 1;
        tracing::debug!(session = %self.id, id = %id, method = %command.method(), "Posted command");
        Ok(id)
    }

    // ---- Notification dispatch ----

    /// Deliver every queued notification to listeners.
    ///
    /// Returns how many notifications were delivered. Stops at the first
    /// notification whose dispatch fails; later notifications stay queued.
    pub fn dispatch_pending(&mut self) -> Result<usize, InspectError> {
        let mut delivered = 0;
        while let Some(notification) = self.queue.as_mut().and_then(NotificationQueue::try_recv) {
            self.deliver(&notification)?;
            delivered += 1;
        }
        if delivered > 0 {
            tracing::debug!(session = %self.id, delivered, "Dispatched notifications");
        }
        Ok(delivered)
    }

    /// Wait for the next notification and deliver it.
    ///
    /// Returns `Ok(false)` without waiting when not connected, or once the
    /// backend has dropped every sink for this session.
    pub async fn dispatch_next(&mut self) -> Result<bool, InspectError> {
        let Some(queue) = self.queue.as_mut() else {
            return Ok(false);
        };
        match queue.recv().await {
            Some(notification) => {
                self.deliver(&notification)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn deliver(&self, notification: &Notification) -> Result<(), InspectError> {
        let payload = [notification.to_value()];
        for event in [notification.method(), INSPECTOR_NOTIFICATION] {
            if let Err(err) = self.emitter.emit(event, &payload) {
                tracing::error!(
                    session = %self.id,
                    method = %notification.method(),
                    error = %err,
                    "Notification listener failed"
                );
                return Err(err);
            }
        }
        Ok(())
    }

    // ---- Listener registry ----

    /// Append `listener` to `event`.
    pub fn on(&self, event: &str, listener: Listener) -> &Self {
        self.emitter.on(event, listener);
        self
    }

    /// Alias for [`on`](Self::on).
    pub fn add_listener(&self, event: &str, listener: Listener) -> &Self {
        self.emitter.add_listener(event, listener);
        self
    }

    /// Append a one-shot `listener` to `event`.
    pub fn once(&self, event: &str, listener: Listener) -> &Self {
        self.emitter.once(event, listener);
        self
    }

    /// Insert `listener` at the front of `event`.
    pub fn prepend_listener(&self, event: &str, listener: Listener) -> &Self {
        self.emitter.prepend_listener(event, listener);
        self
    }

    /// Insert a one-shot `listener` at the front of `event`.
    pub fn prepend_once_listener(&self, event: &str, listener: Listener) -> &Self {
        self.emitter.prepend_once_listener(event, listener);
        self
    }

    /// Remove `listener` from `event`. Returns whether it was registered.
    pub fn off(&self, event: &str, listener: &Listener) -> bool {
        self.emitter.off(event, listener)
    }

    /// Alias for [`off`](Self::off).
    pub fn remove_listener(&self, event: &str, listener: &Listener) -> bool {
        self.emitter.remove_listener(event, listener)
    }

    /// Remove every listener of `event`, or of all events when `None`.
    pub fn remove_all_listeners(&self, event: Option<&str>) -> usize {
        self.emitter.remove_all_listeners(event)
    }

    /// Emit `event` directly to this session's listeners.
    pub fn emit(&self, event: &str, args: &[Value]) -> Result<bool, InspectError> {
        self.emitter.emit(event, args)
    }

    /// Number of listeners for `event`, or in total.
    #[must_use]
    pub fn listener_count(&self, event: Option<&str>) -> usize {
        self.emitter.listener_count(event)
    }

    /// Names of events with at least one listener.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.emitter.event_names()
    }

    /// Listeners of `event`, in dispatch order.
    #[must_use]
    pub fn listeners(&self, event: &str) -> Vec<Listener> {
        self.emitter.listeners(event)
    }

    /// Set the leak warning threshold.
    pub fn set_max_listeners(&self, max: usize) -> &Self {
        self.emitter.set_max_listeners(max);
        self
    }

    /// The leak warning threshold.
    #[must_use]
    pub fn max_listeners(&self) -> usize {
        self.emitter.max_listeners()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.state.is_open() {
            tracing::debug!(session = %self.id, state = %self.state, "Releasing session on drop");
        }
        self.close();
    }
}
