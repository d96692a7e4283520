//! `aockit start <day>` - the live development loop.

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::actor::Coordinator;
use crate::config::KitConfig;
use crate::core::register_shutdown;

/// Run the dev loop for `year`/`day` until quit.
pub fn start_dev(config: KitConfig, year: u16, day: u8) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    // Ctrl+C outside raw mode ends the session through the same teardown as `q`.
    let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
    register_shutdown(shutdown_tx);

    rt.block_on(
        Coordinator::new(config, year, day)
            .with_shutdown_signal(shutdown_rx)
            .run(),
    )
}
