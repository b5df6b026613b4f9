//! Notifications produced on other threads.

use inspectkit::prelude::*;
use inspectkit::transport::MemoryBackend;
use inspectkit_testing::{method_listener, CapturedOutput};
use pretty_assertions::assert_eq;

fn connected_session(backend: &MemoryBackend) -> Session {
    let inspector = Inspector::builder()
        .backend(backend.clone())
        .output(CapturedOutput::new())
        .build();
    let mut session = inspector.session();
    session.open(0, "127.0.0.1").unwrap();
    session.connect().unwrap();
    session
}

#[tokio::test]
async fn test_backend_thread_notifications_are_dispatched_in_order() {
    let backend = MemoryBackend::new();
    let out = CapturedOutput::new();
    let mut session = connected_session(&backend);
    session.on(INSPECTOR_NOTIFICATION, method_listener(&out, "All"));

    let producer = backend.clone();
    let handle = tokio::task::spawn_blocking(move || {
        producer.notify(&Notification::new(methods::SCRIPT_PARSED));
        producer.notify(&Notification::new(methods::PAUSED));
        producer.notify(&Notification::new(methods::RESUMED));
    });

    for _ in 0..3 {
        assert!(session.dispatch_next().await.unwrap());
    }
    handle.await.unwrap();

    assert_eq!(
        out.lines(),
        vec![
            "All: Debugger.scriptParsed",
            "All: Debugger.paused",
            "All: Debugger.resumed",
        ]
    );
}

#[tokio::test]
async fn test_concurrent_producers_and_registration() {
    let backend = MemoryBackend::new();
    let out = CapturedOutput::new();
    let mut session = connected_session(&backend);
    session.on(methods::PAUSED, method_listener(&out, "P"));

    let emitter = session.emitter();
    let registrar_out = out.clone();
    let registrar = tokio::task::spawn_blocking(move || {
        for i in 0..20 {
            emitter.on("unrelated", method_listener(&registrar_out, &i.to_string()));
        }
    });
    let producers: Vec<_> = (0..4)
        .map(|_| {
            let backend = backend.clone();
            tokio::task::spawn_blocking(move || {
                for _ in 0..25 {
                    backend.notify(&Notification::new(methods::PAUSED));
                }
            })
        })
        .collect();

    for producer in producers {
        producer.await.unwrap();
    }
    registrar.await.unwrap();

    assert_eq!(session.dispatch_pending().unwrap(), 100);
    assert_eq!(out.lines().len(), 100);
    assert_eq!(session.listener_count(Some("unrelated")), 20);
}

#[tokio::test]
async fn test_dispatch_next_when_disconnected() {
    let backend = MemoryBackend::new();
    let mut session = connected_session(&backend);
    session.disconnect();

    assert!(!session.dispatch_next().await.unwrap());
    assert!(backend.attached_sessions().is_empty());
}
