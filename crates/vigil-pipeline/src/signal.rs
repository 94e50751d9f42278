//! SIGINT/SIGTERM/SIGHUP handling: flip the shared cancellation flag so the
//! orchestrator winds down after its current batch instead of mid-write
//! (spec.md §5 "Cancellation").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Spawns a task that waits for any of SIGINT/SIGTERM/SIGHUP (or just
/// Ctrl-C on platforms without `tokio::signal::unix`) and sets `cancel`.
/// The scan observes `cancel` between files/chunks and stops cleanly;
/// nothing here touches the terminal or exits the process directly.
pub fn install(cancel: Arc<AtomicBool>) {
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        cancel.store(true, Ordering::SeqCst);
    });
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut sighup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(_) => return,
    };

    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
        _ = sighup.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
