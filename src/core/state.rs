//! Process-wide shutdown state.
//!
//! The dev loop normally quits through the `q` hotkey. When stdin is not a
//! terminal there is no raw mode, so Ctrl+C arrives as SIGINT instead of a
//! keypress; the handler installed here routes it into the same teardown.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::UnboundedSender;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender for the dev loop coordinator
static SHUTDOWN_TX: OnceLock<UnboundedSender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `register_shutdown()`: exit immediately, nothing to tear down
/// - After `register_shutdown()`: notify the coordinator for graceful teardown
/// - A second Ctrl+C while tearing down exits immediately
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if SHUTDOWN.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }

        match SHUTDOWN_TX.get() {
            Some(tx) => {
                crate::log!("dev"; "shutting down...");
                let _ = tx.send(());
            }
            None => std::process::exit(0),
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the coordinator's shutdown channel.
pub fn register_shutdown(tx: UnboundedSender<()>) {
    let _ = SHUTDOWN_TX.set(tx);
}
