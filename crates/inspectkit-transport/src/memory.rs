//! In-process debugger backend.
//!
//! [`MemoryBackend`] is the bridge an embedding host uses when its debugger
//! lives in the same process: the host's debugger thread calls
//! [`MemoryBackend::notify`] and every attached session receives the
//! notification in its queue. Posted commands are recorded and handed to an
//! optional command handler.
//!
//! # Example
//!
//! ```rust
//! use inspectkit_core::protocol::{methods, Notification};
//! use inspectkit_transport::{notification_channel, DebuggerBackend, MemoryBackend};
//!
//! let backend = MemoryBackend::new();
//! let (sink, mut queue) = notification_channel();
//! backend.attach("session-1", sink).unwrap();
//!
//! assert_eq!(backend.notify(&Notification::new(methods::PAUSED)), 1);
//! assert_eq!(queue.try_recv().unwrap().method(), methods::PAUSED);
//! ```

use crate::channel::NotificationSink;
use crate::error::TransportError;
use crate::traits::DebuggerBackend;
use inspectkit_core::protocol::{Command, Notification};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Callback invoked for each posted command.
///
/// Receives the backend (to emit notifications in reply), the posting
/// session's id and the command.
pub type CommandHandler =
    dyn Fn(&MemoryBackend, &str, &Command) -> Result<(), TransportError> + Send + Sync;

#[derive(Default)]
struct Inner {
    // Ordered by session id so broadcast order is deterministic.
    sinks: BTreeMap<String, NotificationSink>,
    commands: Vec<(String, Command)>,
}

/// An in-process backend with channel-based notification delivery.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
    handler: Option<Arc<CommandHandler>>,
}

impl fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("attached", &self.attached_sessions())
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl MemoryBackend {
    /// Create a backend with no command handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a command handler.
    #[must_use]
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&MemoryBackend, &str, &Command) -> Result<(), TransportError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver `notification` to every attached session.
    ///
    /// Returns the number of sessions it was queued for. Sinks whose
    /// session has gone away are pruned.
    pub fn notify(&self, notification: &Notification) -> usize {
        let mut inner = self.lock();
        let mut delivered = 0;
        inner.sinks.retain(|session, sink| {
            if sink.send(notification.clone()).is_ok() {
                delivered += 1;
                true
            } else {
                tracing::warn!(session = %session, method = %notification.method, "Dropping notification for closed session");
                false
            }
        });
        delivered
    }

    /// Deliver `notification` to one session only.
    pub fn notify_session(
        &self,
        session: &str,
        notification: Notification,
    ) -> Result<(), TransportError> {
        let inner = self.lock();
        let sink = inner
            .sinks
            .get(session)
            .ok_or_else(|| TransportError::NotAttached {
                session: session.to_string(),
            })?;
        sink.send(notification)
    }

    /// Ids of the sessions currently attached.
    #[must_use]
    pub fn attached_sessions(&self) -> Vec<String> {
        self.lock().sinks.keys().cloned().collect()
    }

    /// Every command posted so far, with the posting session's id.
    #[must_use]
    pub fn commands(&self) -> Vec<(String, Command)> {
        self.lock().commands.clone()
    }
}

impl DebuggerBackend for MemoryBackend {
    fn attach(&self, session: &str, sink: NotificationSink) -> Result<(), TransportError> {
        let mut inner = self.lock();
        if inner.sinks.get(session).is_some_and(|existing| !existing.is_closed()) {
            return Err(TransportError::Attach {
                session: session.to_string(),
                message: "session is already attached".to_string(),
            });
        }
        inner.sinks.insert(session.to_string(), sink);
        tracing::debug!(session, attached = inner.sinks.len(), "Session attached");
        Ok(())
    }

    fn detach(&self, session: &str) {
        if self.lock().sinks.remove(session).is_some() {
            tracing::debug!(session, "Session detached");
        }
    }

    fn handle_command(&self, session: &str, command: &Command) -> Result<(), TransportError> {
        {
            let mut inner = self.lock();
            if !inner.sinks.contains_key(session) {
                return Err(TransportError::NotAttached {
                    session: session.to_string(),
                });
            }
            inner.commands.push((session.to_string(), command.clone()));
        }

        tracing::debug!(session, id = %command.id, method = %command.method, "Handling command");

        // The handler runs without the lock so it can call notify().
        match &self.handler {
            Some(handler) => handler(self, session, command),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::notification_channel;
    use inspectkit_core::protocol::methods;

    #[test]
    fn test_broadcast_reaches_all_sessions() {
        let backend = MemoryBackend::new();
        let (sink_a, mut queue_a) = notification_channel();
        let (sink_b, mut queue_b) = notification_channel();
        backend.attach("a", sink_a).unwrap();
        backend.attach("b", sink_b).unwrap();

        assert_eq!(backend.notify(&Notification::new(methods::PAUSED)), 2);
        assert!(queue_a.try_recv().is_some());
        assert!(queue_b.try_recv().is_some());
    }

    #[test]
    fn test_closed_sessions_are_pruned() {
        let backend = MemoryBackend::new();
        let (sink, queue) = notification_channel();
        backend.attach("gone", sink).unwrap();
        drop(queue);

        assert_eq!(backend.notify(&Notification::new(methods::PAUSED)), 0);
        assert!(backend.attached_sessions().is_empty());
    }

    #[test]
    fn test_double_attach_is_rejected() {
        let backend = MemoryBackend::new();
        let (sink, _queue) = notification_channel();
        backend.attach("s", sink.clone()).unwrap();

        let err = backend.attach("s", sink).unwrap_err();
        assert!(matches!(err, TransportError::Attach { .. }));
    }

    #[test]
    fn test_commands_require_attachment() {
        let backend = MemoryBackend::new();
        let command = Command::new(1u64, methods::ENABLE);
        assert!(matches!(
            backend.handle_command("nobody", &command),
            Err(TransportError::NotAttached { .. })
        ));
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn test_handler_can_reply_with_notifications() {
        let backend = MemoryBackend::new().with_handler(|backend, session, command| {
            if command.method() == methods::ENABLE {
                backend.notify_session(session, Notification::new(methods::SCRIPT_PARSED))?;
            }
            Ok(())
        });
        let (sink, mut queue) = notification_channel();
        backend.attach("s", sink).unwrap();

        backend
            .handle_command("s", &Command::new(1u64, methods::ENABLE))
            .unwrap();

        assert_eq!(queue.try_recv().unwrap().method(), methods::SCRIPT_PARSED);
        assert_eq!(backend.commands().len(), 1);
    }

    #[test]
    fn test_detach_unknown_is_noop() {
        let backend = MemoryBackend::new();
        backend.detach("never-attached");
        assert!(backend.attached_sessions().is_empty());
    }
}
