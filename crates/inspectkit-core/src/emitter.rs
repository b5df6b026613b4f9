//! Ordered, mutation-safe event emitter.
//!
//! An [`EventEmitter`] maps event names to ordered listener lists and
//! dispatches synchronously on the caller's thread.
//!
//! # Dispatch Semantics
//!
//! - `emit` invokes a snapshot of the event's list taken when the call
//!   starts. A listener removed during the pass is still invoked in that
//!   pass; a listener added during the pass is not.
//! - The table lock is never held while a listener runs, so listeners may
//!   call `on`/`off`/`emit` on the same emitter.
//! - A one-shot listener is claimed before it runs and removed from the live
//!   list as soon as it returns. Nested emits of the same event never run it
//!   twice.
//! - A listener returning `Err` aborts the pass; the error is returned from
//!   `emit` and later listeners in the snapshot are not invoked.
//!
//! # Example
//!
//! ```rust
//! use inspectkit_core::emitter::{EventEmitter, Listener};
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let record = |name: &'static str| {
//!     let seen = Arc::clone(&seen);
//!     Listener::infallible(move |_| seen.lock().unwrap().push(name))
//! };
//!
//! let emitter = EventEmitter::new();
//! emitter.on("evt", record("second"));
//! emitter.prepend_listener("evt", record("first"));
//!
//! assert!(emitter.emit("evt", &[]).unwrap());
//! assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
//! assert!(!emitter.emit("other", &[]).unwrap());
//! ```

use crate::error::{InspectError, ListenerError};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default per-event listener count above which a leak warning is logged.
pub const DEFAULT_MAX_LISTENERS: usize = 10;

/// Closure type for event listeners.
pub type ListenerFn = dyn Fn(&[Value]) -> Result<(), ListenerError> + Send + Sync;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Listener`].
///
/// Clones of a listener share its id; two listeners built from identical
/// closures do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// A callback handle that can be registered on an [`EventEmitter`].
///
/// Listeners compare by identity: `off` removes an entry only when given
/// (a clone of) the same handle that was registered.
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    callback: Arc<ListenerFn>,
}

impl Listener {
    /// Create a listener from a fallible callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&[Value]) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        Self {
            id: ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed)),
            callback: Arc::new(callback),
        }
    }

    /// Create a listener from a callback that cannot fail.
    pub fn infallible<F>(callback: F) -> Self
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        Self::new(move |args| {
            callback(args);
            Ok(())
        })
    }

    /// This listener's identity.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Invoke the callback.
    pub fn call(&self, args: &[Value]) -> Result<(), ListenerError> {
        (self.callback)(args)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish_non_exhaustive()
    }
}

/// A registration of a listener under one event name.
#[derive(Clone)]
struct ListenerEntry {
    listener: Listener,
    once: bool,
    // Per-entry token: set when a one-shot entry is claimed, and used to find
    // this exact entry again (the same listener may be registered twice).
    claimed: Arc<AtomicBool>,
}

impl ListenerEntry {
    fn new(listener: Listener, once: bool) -> Self {
        Self {
            listener,
            once,
            claimed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn is(&self, claimed: &Arc<AtomicBool>) -> bool {
        Arc::ptr_eq(&self.claimed, claimed)
    }
}

#[derive(Default)]
struct EventTable {
    events: HashMap<String, Vec<ListenerEntry>>,
    // Events we already logged a max-listeners warning for.
    warned: HashSet<String>,
}

impl EventTable {
    fn remove_where(&mut self, event: &str, pred: impl Fn(&ListenerEntry) -> bool) -> bool {
        let Some(list) = self.events.get_mut(event) else {
            return false;
        };
        let Some(pos) = list.iter().position(pred) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.events.remove(event);
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Back,
    Front,
}

/// A per-object registry of event listeners.
pub struct EventEmitter {
    table: Mutex<EventTable>,
    max_listeners: AtomicUsize,
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("event_names", &self.event_names())
            .field("listener_count", &self.listener_count(None))
            .finish()
    }
}

impl EventEmitter {
    /// Create an empty emitter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Mutex::new(EventTable::default()),
            max_listeners: AtomicUsize::new(DEFAULT_MAX_LISTENERS),
        }
    }

    /// Create an emitter with a custom leak warning threshold.
    #[must_use]
    pub fn with_max_listeners(max: usize) -> Self {
        let emitter = Self::new();
        emitter.set_max_listeners(max);
        emitter
    }

    // A poisoned table is still structurally valid: callbacks never run under
    // the guard.
    fn lock(&self) -> MutexGuard<'_, EventTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, event: &str, listener: Listener, once: bool, placement: Placement) {
        let max = self.max_listeners();
        let mut table = self.lock();
        let list = table.events.entry(event.to_string()).or_default();
        let entry = ListenerEntry::new(listener, once);
        let id = entry.listener.id();
        match placement {
            Placement::Back => list.push(entry),
            Placement::Front => list.insert(0, entry),
        }
        let count = list.len();

        tracing::debug!(event, listener = %id, once, ?placement, count, "Registered listener");

        if max > 0 && count > max && table.warned.insert(event.to_string()) {
            tracing::warn!(
                event,
                count,
                max,
                "Possible listener leak: more listeners than the configured maximum"
            );
        }
    }

    /// Append `listener` to the end of `event`'s list.
    pub fn on(&self, event: &str, listener: Listener) {
        self.register(event, listener, false, Placement::Back);
    }

    /// Alias for [`EventEmitter::on`].
    pub fn add_listener(&self, event: &str, listener: Listener) {
        self.on(event, listener);
    }

    /// Insert `listener` at the front of `event`'s list.
    pub fn prepend_listener(&self, event: &str, listener: Listener) {
        self.register(event, listener, false, Placement::Front);
    }

    /// Append a one-shot `listener`.
    pub fn once(&self, event: &str, listener: Listener) {
        self.register(event, listener, true, Placement::Back);
    }

    /// Insert a one-shot `listener` at the front of `event`'s list.
    pub fn prepend_once_listener(&self, event: &str, listener: Listener) {
        self.register(event, listener, true, Placement::Front);
    }

    /// Remove the first registration of `listener` under `event`.
    ///
    /// Returns `false` (and does nothing) when no registration matches.
    pub fn off(&self, event: &str, listener: &Listener) -> bool {
        let id = listener.id();
        let removed = self
            .lock()
            .remove_where(event, |entry| entry.listener.id() == id);
        if removed {
            tracing::debug!(event, listener = %id, "Removed listener");
        }
        removed
    }

    /// Alias for [`EventEmitter::off`].
    pub fn remove_listener(&self, event: &str, listener: &Listener) -> bool {
        self.off(event, listener)
    }

    /// Remove every listener of `event`, or of all events when `None`.
    ///
    /// Returns the number of registrations removed.
    pub fn remove_all_listeners(&self, event: Option<&str>) -> usize {
        let mut table = self.lock();
        let removed = match event {
            Some(event) => table.events.remove(event).map_or(0, |list| list.len()),
            None => table.events.drain().map(|(_, list)| list.len()).sum(),
        };
        tracing::debug!(event, removed, "Removed all listeners");
        removed
    }

    /// Dispatch `event` to its listeners.
    ///
    /// Returns `Ok(true)` if the event had at least one listener when the
    /// call started, `Ok(false)` otherwise.
    pub fn emit(&self, event: &str, args: &[Value]) -> Result<bool, InspectError> {
        let snapshot = match self.lock().events.get(event) {
            Some(list) if !list.is_empty() => list.clone(),
            _ => return Ok(false),
        };

        tracing::trace!(event, listeners = snapshot.len(), "Emitting event");

        for entry in &snapshot {
            if entry.once && entry.claimed.swap(true, Ordering::AcqRel) {
                // Already fired by a nested emit.
                continue;
            }

            let result = entry.listener.call(args);

            if entry.once {
                self.lock()
                    .remove_where(event, |candidate| candidate.is(&entry.claimed));
            }

            if let Err(source) = result {
                tracing::debug!(event, listener = %entry.listener.id(), error = %source, "Listener failed");
                return Err(InspectError::Listener {
                    event: event.to_string(),
                    source,
                });
            }
        }

        Ok(true)
    }

    /// Number of listeners registered for `event`, or in total when `None`.
    #[must_use]
    pub fn listener_count(&self, event: Option<&str>) -> usize {
        let table = self.lock();
        match event {
            Some(event) => table.events.get(event).map_or(0, Vec::len),
            None => table.events.values().map(Vec::len).sum(),
        }
    }

    /// Names of events that currently have at least one listener, sorted.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().events.keys().cloned().collect();
        names.sort();
        names
    }

    /// The listeners of `event`, in dispatch order.
    #[must_use]
    pub fn listeners(&self, event: &str) -> Vec<Listener> {
        self.lock().events.get(event).map_or_else(Vec::new, |list| {
            list.iter().map(|entry| entry.listener.clone()).collect()
        })
    }

    /// Set the per-event leak warning threshold (0 disables the warning).
    pub fn set_max_listeners(&self, max: usize) {
        self.max_listeners.store(max, Ordering::Relaxed);
        self.lock().warned.clear();
    }

    /// The per-event leak warning threshold.
    #[must_use]
    pub fn max_listeners(&self) -> usize {
        self.max_listeners.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    type Log = Arc<Mutex<Vec<String>>>;

    fn log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn printer(log: &Log, name: &'static str) -> Listener {
        let log = Arc::clone(log);
        Listener::infallible(move |args| {
            let arg = args.first().and_then(Value::as_str).unwrap_or_default();
            log.lock().unwrap().push(format!("{name}: {arg}"));
        })
    }

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.lock().unwrap())
    }

    #[test]
    fn test_emit_without_listeners() {
        let emitter = EventEmitter::new();
        assert!(!emitter.emit("hello", &[]).unwrap());
        assert_eq!(emitter.listener_count(None), 0);
        assert!(emitter.event_names().is_empty());
    }

    #[test]
    fn test_prepend_and_append_order() {
        let out = log();
        let emitter = EventEmitter::new();
        emitter.on("e", printer(&out, "a1"));
        emitter.prepend_listener("e", printer(&out, "p1"));
        emitter.add_listener("e", printer(&out, "a2"));
        emitter.prepend_listener("e", printer(&out, "p2"));

        emitter.emit("e", &[json!("x")]).unwrap();
        assert_eq!(take(&out), vec!["p2: x", "p1: x", "a1: x", "a2: x"]);
    }

    #[test]
    fn test_once_fires_exactly_once() {
        let out = log();
        let emitter = EventEmitter::new();
        emitter.once("e", printer(&out, "once"));

        assert!(emitter.emit("e", &[json!("1")]).unwrap());
        assert!(!emitter.emit("e", &[json!("2")]).unwrap());
        assert_eq!(take(&out), vec!["once: 1"]);
        assert!(emitter.event_names().is_empty());
    }

    #[test]
    fn test_off_matches_identity_not_behavior() {
        let out = log();
        let emitter = EventEmitter::new();
        let registered = printer(&out, "same");
        let lookalike = printer(&out, "same");
        emitter.on("e", registered.clone());

        assert!(!emitter.off("e", &lookalike));
        assert!(!emitter.off("other", &registered));
        assert_eq!(emitter.listener_count(Some("e")), 1);

        assert!(emitter.off("e", &registered));
        assert_eq!(emitter.listener_count(Some("e")), 0);
        assert!(!emitter.off("e", &registered));
    }

    #[test]
    fn test_off_removes_first_registration_only() {
        let out = log();
        let emitter = EventEmitter::new();
        let twice = printer(&out, "twice");
        emitter.on("e", twice.clone());
        emitter.on("e", twice.clone());

        emitter.off("e", &twice);
        assert_eq!(emitter.listener_count(Some("e")), 1);
        emitter.emit("e", &[json!("x")]).unwrap();
        assert_eq!(take(&out), vec!["twice: x"]);
    }

    #[test]
    fn test_removal_during_emit_does_not_skip() {
        let out = log();
        let emitter = Arc::new(EventEmitter::new());
        let victim = printer(&out, "victim");

        let remover = {
            let emitter = Arc::clone(&emitter);
            let victim = victim.clone();
            let out = Arc::clone(&out);
            Listener::infallible(move |_| {
                out.lock().unwrap().push("remover".to_string());
                emitter.off("e", &victim);
            })
        };
        emitter.on("e", remover);
        emitter.on("e", victim);

        emitter.emit("e", &[json!("1")]).unwrap();
        assert_eq!(take(&out), vec!["remover", "victim: 1"]);

        emitter.emit("e", &[json!("2")]).unwrap();
        assert_eq!(take(&out), vec!["remover"]);
    }

    #[test]
    fn test_addition_during_emit_waits_for_next_pass() {
        let out = log();
        let emitter = Arc::new(EventEmitter::new());
        let late = printer(&out, "late");

        let adder = {
            let emitter = Arc::clone(&emitter);
            Listener::infallible(move |_| emitter.on("e", late.clone()))
        };
        emitter.once("e", adder);

        emitter.emit("e", &[json!("1")]).unwrap();
        assert!(take(&out).is_empty());

        emitter.emit("e", &[json!("2")]).unwrap();
        assert_eq!(take(&out), vec!["late: 2"]);
    }

    #[test]
    fn test_nested_emit_does_not_refire_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let emitter = Arc::new(EventEmitter::new());

        let reentrant = {
            let emitter = Arc::clone(&emitter);
            let count = Arc::clone(&count);
            Listener::infallible(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
                emitter.emit("e", &[]).unwrap();
            })
        };
        emitter.once("e", reentrant);

        assert!(emitter.emit("e", &[]).unwrap());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.listener_count(None), 0);
    }

    #[test]
    fn test_listener_error_aborts_pass() {
        let out = log();
        let emitter = EventEmitter::new();
        emitter.on("e", printer(&out, "before"));
        emitter.once("e", Listener::new(|_| Err(ListenerError::new("boom"))));
        emitter.on("e", printer(&out, "after"));

        let err = emitter.emit("e", &[json!("x")]).unwrap_err();
        assert!(matches!(&err, InspectError::Listener { event, .. } if event == "e"));
        assert_eq!(take(&out), vec!["before: x"]);

        // The failing one-shot was consumed; the others remain.
        assert_eq!(emitter.listener_count(Some("e")), 2);
        emitter.emit("e", &[json!("y")]).unwrap();
        assert_eq!(take(&out), vec!["before: y", "after: y"]);
    }

    #[test]
    fn test_count_equals_sum_over_names() {
        let out = log();
        let emitter = EventEmitter::new();
        emitter.on("a", printer(&out, "1"));
        emitter.once("b", printer(&out, "2"));
        emitter.prepend_once_listener("b", printer(&out, "3"));
        emitter.on("c", printer(&out, "4"));

        let sum: usize = emitter
            .event_names()
            .iter()
            .map(|name| emitter.listener_count(Some(name.as_str())))
            .sum();
        assert_eq!(emitter.listener_count(None), sum);
        assert_eq!(emitter.event_names(), vec!["a", "b", "c"]);

        emitter.emit("b", &[]).unwrap();
        assert_eq!(emitter.event_names(), vec!["a", "c"]);
        assert_eq!(emitter.listener_count(None), 2);
    }

    #[test]
    fn test_remove_all_listeners() {
        let out = log();
        let emitter = EventEmitter::new();
        emitter.on("a", printer(&out, "1"));
        emitter.on("a", printer(&out, "2"));
        emitter.on("b", printer(&out, "3"));

        assert_eq!(emitter.remove_all_listeners(Some("a")), 2);
        assert_eq!(emitter.event_names(), vec!["b"]);
        assert_eq!(emitter.remove_all_listeners(None), 1);
        assert_eq!(emitter.listener_count(None), 0);
    }

    #[test]
    fn test_listeners_snapshot_in_dispatch_order() {
        let out = log();
        let emitter = EventEmitter::new();
        let first = printer(&out, "first");
        let second = printer(&out, "second");
        emitter.on("e", second.clone());
        emitter.prepend_once_listener("e", first.clone());

        assert_eq!(emitter.listeners("e"), vec![first, second]);
        assert!(emitter.listeners("missing").is_empty());
    }

    #[test]
    fn test_max_listeners_is_advisory() {
        let out = log();
        let emitter = EventEmitter::with_max_listeners(1);
        emitter.on("e", printer(&out, "1"));
        emitter.on("e", printer(&out, "2"));
        assert_eq!(emitter.max_listeners(), 1);
        assert_eq!(emitter.listener_count(Some("e")), 2);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn leak_warnings(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .filter(|line| line.contains("Possible listener leak"))
                .map(str::to_string)
                .collect()
        }
    }

    #[test]
    fn test_leak_warning_once_per_event_until_rearmed() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();

        let out = log();
        let emitter = EventEmitter::with_max_listeners(1);
        tracing::subscriber::with_default(subscriber, || {
            for name in ["a1", "a2", "a3"] {
                emitter.on("alpha", printer(&out, name));
            }
            emitter.on("beta", printer(&out, "b1"));
            emitter.on("beta", printer(&out, "b2"));
        });

        let warnings = logs.leak_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("alpha"));
        assert!(warnings[1].contains("beta"));

        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            emitter.set_max_listeners(1);
            emitter.on("alpha", printer(&out, "a4"));
            emitter.on("alpha", printer(&out, "a5"));
        });

        let warnings = logs.leak_warnings();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[2].contains("alpha"));
        assert_eq!(emitter.listener_count(Some("alpha")), 5);
    }

    #[test]
    fn test_zero_max_listeners_never_warns() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();

        let out = log();
        let emitter = EventEmitter::with_max_listeners(0);
        tracing::subscriber::with_default(subscriber, || {
            for name in ["1", "2", "3"] {
                emitter.on("e", printer(&out, name));
            }
        });

        assert!(logs.leak_warnings().is_empty());
    }

    #[test]
    fn test_event_names_are_case_sensitive() {
        let out = log();
        let emitter = EventEmitter::new();
        emitter.on("Evt", printer(&out, "upper"));
        assert!(!emitter.emit("evt", &[]).unwrap());
        assert_eq!(emitter.listener_count(Some("evt")), 0);
    }
}
