//! Simulated debugger backend.
//!
//! [`ScriptedBackend`] plays the part of a script engine's debugger:
//!
//! - `Debugger.enable` from a session reports every loaded script to that
//!   session as `Debugger.scriptParsed`;
//! - [`ScriptedBackend::hit_debugger_statement`] pauses and resumes every
//!   session that has enabled the debugger;
//! - `Debugger.disable` stops further pause notifications for the session.
//!
//! ```rust
//! use inspectkit_core::protocol::{methods, Command};
//! use inspectkit_testing::ScriptedBackend;
//! use inspectkit_transport::{notification_channel, DebuggerBackend};
//!
//! let backend = ScriptedBackend::new();
//! let (sink, mut queue) = notification_channel();
//! backend.attach("s", sink).unwrap();
//! backend.handle_command("s", &Command::new(1u64, methods::ENABLE)).unwrap();
//!
//! assert_eq!(queue.try_recv().unwrap().method(), methods::SCRIPT_PARSED);
//! ```

use crate::fixtures::sample_scripts;
use inspectkit_core::protocol::{methods, Command, Notification};
use inspectkit_transport::channel::NotificationSink;
use inspectkit_transport::error::TransportError;
use inspectkit_transport::memory::MemoryBackend;
use inspectkit_transport::traits::DebuggerBackend;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A [`DebuggerBackend`] that replays a fixed debugging scenario.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    memory: MemoryBackend,
    enabled: Arc<Mutex<BTreeSet<String>>>,
    scripts: Arc<Vec<String>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    /// Create a backend reporting [`sample_scripts`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_scripts(sample_scripts())
    }

    /// Create a backend reporting the given script URLs.
    #[must_use]
    pub fn with_scripts(scripts: Vec<String>) -> Self {
        let enabled: Arc<Mutex<BTreeSet<String>>> = Arc::default();
        let scripts = Arc::new(scripts);

        let handler_enabled = Arc::clone(&enabled);
        let handler_scripts = Arc::clone(&scripts);
        let memory = MemoryBackend::new().with_handler(move |backend, session, command| {
            match command.method() {
                methods::ENABLE => {
                    lock(&handler_enabled).insert(session.to_string());
                    for (index, url) in handler_scripts.iter().enumerate() {
                        backend.notify_session(session, script_parsed(index, url))?;
                    }
                }
                methods::DISABLE => {
                    lock(&handler_enabled).remove(session);
                }
                _ => {}
            }
            Ok(())
        });

        Self {
            memory,
            enabled,
            scripts,
        }
    }

    /// Simulate the debuggee executing a `debugger;` statement.
    ///
    /// Every enabled session receives `Debugger.paused` followed by
    /// `Debugger.resumed`. Returns the number of sessions paused.
    pub fn hit_debugger_statement(&self) -> usize {
        let sessions: Vec<String> = lock(&self.enabled).iter().cloned().collect();
        let mut paused = 0;
        for session in sessions {
            let delivered = self
                .memory
                .notify_session(&session, paused_notification())
                .and_then(|()| {
                    self.memory
                        .notify_session(&session, Notification::new(methods::RESUMED))
                });
            if delivered.is_ok() {
                paused += 1;
            }
        }
        paused
    }

    /// Deliver an arbitrary notification to every attached session.
    pub fn notify(&self, notification: &Notification) -> usize {
        self.memory.notify(notification)
    }

    /// Every command posted so far, with the posting session's id.
    #[must_use]
    pub fn commands(&self) -> Vec<(String, Command)> {
        self.memory.commands()
    }

    /// Methods of every command posted so far, in order.
    #[must_use]
    pub fn command_methods(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .map(|(_, command)| command.method().to_string())
            .collect()
    }

    /// Ids of the sessions currently attached.
    #[must_use]
    pub fn attached_sessions(&self) -> Vec<String> {
        self.memory.attached_sessions()
    }

    /// Ids of the sessions that have enabled the debugger.
    #[must_use]
    pub fn enabled_sessions(&self) -> Vec<String> {
        lock(&self.enabled).iter().cloned().collect()
    }

    /// The script URLs reported on `Debugger.enable`.
    #[must_use]
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }
}

impl DebuggerBackend for ScriptedBackend {
    fn attach(&self, session: &str, sink: NotificationSink) -> Result<(), TransportError> {
        self.memory.attach(session, sink)
    }

    fn detach(&self, session: &str) {
        lock(&self.enabled).remove(session);
        self.memory.detach(session);
    }

    fn handle_command(&self, session: &str, command: &Command) -> Result<(), TransportError> {
        self.memory.handle_command(session, command)
    }
}

fn lock(set: &Mutex<BTreeSet<String>>) -> MutexGuard<'_, BTreeSet<String>> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}

fn script_parsed(index: usize, url: &str) -> Notification {
    Notification::with_params(
        methods::SCRIPT_PARSED,
        json!({ "scriptId": index.to_string(), "url": url }),
    )
}

fn paused_notification() -> Notification {
    Notification::with_params(
        methods::PAUSED,
        json!({ "reason": "other", "callFrames": [], "hitBreakpoints": [] }),
    )
}
