//! Replays the two classic inspector scenarios against a live session.
//!
//! Run with `RUST_LOG=inspectkit_session=debug` to watch the lifecycle.

use inspectkit::prelude::*;
use inspectkit::transport::{MemoryBackend, SharedOutput};
use serde_json::{Value, json};
use std::thread;
use tracing::info;

fn printer(name: &'static str) -> Listener {
    Listener::infallible(move |args| match args.first() {
        Some(Value::String(s)) => println!("{name}: {s}"),
        Some(other) => println!("{name}: {other}"),
        None => println!("{name}:"),
    })
}

fn method_printer(prefix: &'static str) -> Listener {
    Listener::infallible(move |args| {
        let method = args
            .first()
            .and_then(|arg| arg["method"].as_str())
            .unwrap_or_default();
        println!("{prefix}: {method}");
    })
}

fn listener_scenario(inspector: &Inspector) -> Result<(), InspectError> {
    info!("Running listener scenario");
    let s = inspector.session();
    let (l1, l2, l3) = (printer("l1"), printer("l2"), printer("l3"));

    s.on("evt_a", l1.clone());
    s.add_listener("evt_a", l2.clone());
    s.prepend_listener("evt_a", l3.clone());
    println!("{}", s.listener_count(None));
    s.emit("evt_a", &[json!("A")])?;

    s.once("evt_b", l1);
    s.add_listener("evt_b", l2.clone());
    s.prepend_once_listener("evt_b", l3);
    println!("{}", s.listener_count(None));
    s.emit("evt_b", &[json!("B")])?;
    println!(
        "{} = {} + {}",
        s.listener_count(None),
        s.listener_count(Some("evt_a")),
        s.listener_count(Some("evt_b"))
    );

    s.emit("evt_b", &[json!("BB")])?;
    s.off("evt_b", &l2);
    if s.emit("evt_b", &[json!("BB")])? {
        println!("Error emit");
    }
    println!("{}", s.listener_count(None));
    Ok(())
}

async fn events_scenario(inspector: &Inspector, backend: &MemoryBackend) -> Result<(), InspectError> {
    info!("Running notification scenario");
    let mut s = inspector.session();
    s.on(methods::PAUSED, method_printer("P"));
    s.on(INSPECTOR_NOTIFICATION, method_printer("All"));

    s.open(0, "127.0.0.1")?;
    s.connect()?;
    s.post(methods::ENABLE, None)?;
    s.dispatch_pending()?;

    // The debuggee runs on its own thread and hits a `debugger;` statement.
    let debuggee = backend.clone();
    let handle = thread::spawn(move || {
        debuggee.notify(&Notification::with_params(
            methods::PAUSED,
            json!({ "reason": "other", "callFrames": [] }),
        ));
        debuggee.notify(&Notification::new(methods::RESUMED));
    });
    for _ in 0..2 {
        s.dispatch_next().await?;
    }
    if handle.join().is_err() {
        tracing::error!("Debuggee thread panicked");
    }

    s.disconnect();
    let delivered = backend.notify(&Notification::new(methods::PAUSED));
    info!(delivered, "Notified after disconnect");
    s.dispatch_pending()?;
    s.close();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let backend = MemoryBackend::new().with_handler(|backend, session, command| {
        if command.method() == methods::ENABLE {
            for (id, url) in ["file:///demo/main.js", "file:///demo/util.js"].iter().enumerate() {
                backend.notify_session(
                    session,
                    Notification::with_params(
                        methods::SCRIPT_PARSED,
                        json!({ "scriptId": id.to_string(), "url": url }),
                    ),
                )?;
            }
        }
        Ok(())
    });

    let inspector = Inspector::builder()
        .backend(backend.clone())
        .output(SharedOutput::stdout())
        .build();

    listener_scenario(&inspector)?;
    events_scenario(&inspector, &backend).await?;
    Ok(())
}
