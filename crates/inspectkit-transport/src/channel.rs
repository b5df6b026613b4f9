//! Notification delivery channel.
//!
//! Backends run on their own threads and must not touch a session's
//! listener table directly. Instead they push notifications into a
//! [`NotificationSink`]; the session owns the matching
//! [`NotificationQueue`] and drains it on its own thread.
//!
//! # Example
//!
//! ```rust
//! use inspectkit_core::protocol::{methods, Notification};
//! use inspectkit_transport::channel::notification_channel;
//!
//! let (sink, mut queue) = notification_channel();
//! std::thread::spawn(move || {
//!     sink.send(Notification::new(methods::RESUMED)).unwrap();
//! })
//! .join()
//! .unwrap();
//!
//! let received = queue.try_recv().unwrap();
//! assert_eq!(received.method(), methods::RESUMED);
//! assert!(queue.try_recv().is_none());
//! ```

use crate::error::TransportError;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::{FutureExt, StreamExt};
use inspectkit_core::protocol::Notification;

/// Create a connected sink/queue pair.
#[must_use]
pub fn notification_channel() -> (NotificationSink, NotificationQueue) {
    let (sender, receiver) = mpsc::unbounded();
    (
        NotificationSink { sender },
        NotificationQueue {
            receiver,
            closed: false,
        },
    )
}

/// The sending half, handed to a backend when a session attaches.
///
/// Cloneable and usable from any thread.
#[derive(Debug, Clone)]
pub struct NotificationSink {
    sender: UnboundedSender<Notification>,
}

impl NotificationSink {
    /// Queue a notification for delivery.
    ///
    /// Fails with [`TransportError::ChannelClosed`] once the session has
    /// disconnected and dropped its queue.
    pub fn send(&self, notification: Notification) -> Result<(), TransportError> {
        self.sender
            .unbounded_send(notification)
            .map_err(|_| TransportError::ChannelClosed)
    }

    /// Whether the receiving side is gone.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The receiving half, owned by a connected session.
#[derive(Debug)]
pub struct NotificationQueue {
    receiver: UnboundedReceiver<Notification>,
    closed: bool,
}

impl NotificationQueue {
    /// Take the next queued notification without blocking.
    ///
    /// Returns `None` when nothing is queued right now.
    pub fn try_recv(&mut self) -> Option<Notification> {
        if self.closed {
            return None;
        }
        match self.receiver.next().now_or_never() {
            Some(Some(notification)) => Some(notification),
            Some(None) => {
                self.closed = true;
                None
            }
            None => None,
        }
    }

    /// Wait for the next notification.
    ///
    /// Returns `None` once every sink has been dropped.
    pub async fn recv(&mut self) -> Option<Notification> {
        if self.closed {
            return None;
        }
        let next = self.receiver.next().await;
        if next.is_none() {
            self.closed = true;
        }
        next
    }

    /// Stop accepting notifications and return everything already queued.
    pub fn close(&mut self) -> Vec<Notification> {
        self.receiver.close();
        let mut remaining = Vec::new();
        while let Some(notification) = self.try_recv() {
            remaining.push(notification);
        }
        self.closed = true;
        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspectkit_core::protocol::methods;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_order_is_preserved() {
        let (sink, mut queue) = notification_channel();
        sink.send(Notification::new(methods::PAUSED)).unwrap();
        sink.send(Notification::new(methods::RESUMED)).unwrap();

        assert_eq!(queue.try_recv().unwrap().method(), methods::PAUSED);
        assert_eq!(queue.try_recv().unwrap().method(), methods::RESUMED);
        assert!(queue.try_recv().is_none());
    }

    #[test]
    fn test_send_after_queue_dropped_fails() {
        let (sink, queue) = notification_channel();
        drop(queue);

        assert!(sink.is_closed());
        assert!(matches!(
            sink.send(Notification::new(methods::PAUSED)),
            Err(TransportError::ChannelClosed)
        ));
    }

    #[test]
    fn test_close_returns_pending() {
        let (sink, mut queue) = notification_channel();
        sink.send(Notification::new(methods::SCRIPT_PARSED)).unwrap();

        let pending = queue.close();
        assert_eq!(pending.len(), 1);
        assert!(sink.send(Notification::new(methods::PAUSED)).is_err());
        assert!(queue.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_recv_across_threads() {
        let (sink, mut queue) = notification_channel();

        let producer = tokio::task::spawn_blocking(move || {
            for _ in 0..3 {
                sink.send(Notification::new(methods::SCRIPT_PARSED)).unwrap();
            }
        });

        for _ in 0..3 {
            let notification = queue.recv().await.unwrap();
            assert_eq!(notification.method(), methods::SCRIPT_PARSED);
        }
        producer.await.unwrap();
        assert!(queue.recv().await.is_none());
    }
}
