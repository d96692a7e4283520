//! Watch Actor
//!
//! Subscribes to changes under a day directory and asks for a reload on
//! every qualifying update.
//!
//! ```text
//! notify (own thread) → channel → WatchActor (filter) → ReloadMsg → debounce
//! ```
//!
//! A watcher error ends the session: without change detection the loop is
//! useless, so the actor reports [`ControlMsg::WatchFailed`] and stops.

pub mod filter;


use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use tokio::sync::mpsc;

use super::messages::{ControlMsg, ReloadMsg};
use crate::utils::path::display_relative;
use crate::{debug, log};
pub use filter::IgnoreSet;

type NotifyRx = mpsc::UnboundedReceiver<notify::Result<notify::Event>>;

/// The live subscription. Dropping it unsubscribes.
pub struct WatchSession {
    dir: PathBuf,
    watcher: RecommendedWatcher,
}

impl WatchSession {
    /// Subscribe recursively to `dir`, returning the session and the actor
    /// that consumes its events.
    pub fn start(
        dir: &Path,
        ignores: IgnoreSet,
        display_root: &Path,
        reload_tx: mpsc::UnboundedSender<ReloadMsg>,
        control_tx: mpsc::UnboundedSender<ControlMsg>,
    ) -> Result<(Self, WatchActor)> {
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })
        .context("Failed to create file watcher")?;
        watcher
            .watch(dir, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
        debug!("watch"; "subscribed to {}", dir.display());

        let actor = WatchActor {
            rx: notify_rx,
            ignores,
            display_root: display_root.to_path_buf(),
            reload_tx,
            control_tx,
        };
        let session = Self {
            dir: dir.to_path_buf(),
            watcher,
        };
        Ok((session, actor))
    }

    /// Remove the subscription. Consumes the session, so it happens once.
    pub fn unwatch(mut self) {
        if let Err(e) = self.watcher.unwatch(&self.dir) {
            debug!("watch"; "unwatch failed: {}", e);
        }
        debug!("watch"; "unsubscribed from {}", self.dir.display());
    }
}

/// Filters raw notify events into reload requests.
pub struct WatchActor {
    rx: NotifyRx,
    ignores: IgnoreSet,
    /// Paths are logged relative to this directory
    display_root: PathBuf,
    reload_tx: mpsc::UnboundedSender<ReloadMsg>,
    control_tx: mpsc::UnboundedSender<ControlMsg>,
}

impl WatchActor {
    /// Run until the session is dropped, a receiver goes away, or the
    /// watcher fails.
    pub async fn run(mut self) {
        while let Some(result) = self.rx.recv().await {
            let event = match result {
                Ok(event) => event,
                Err(e) => {
                    log!("watch:error"; "{}", e);
                    let _ = self.control_tx.send(ControlMsg::WatchFailed(e.to_string()));
                    return;
                }
            };

            let changed = qualifying_paths(&event, &self.ignores);
            if changed.is_empty() {
                continue;
            }
            for path in &changed {
                log!("watch"; "change: {}", display_relative(path, &self.display_root));
            }
            if self.reload_tx.send(ReloadMsg::Reload(None)).is_err() {
                return;
            }
        }
        debug!("watch"; "event channel closed");
    }
}

/// Content updates count; removals, access and metadata-only changes do not.
fn is_update(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) => true,
        EventKind::Modify(modify) => !matches!(modify, ModifyKind::Metadata(_)),
        _ => false,
    }
}

/// Paths of `event` that should trigger a reload, each once.
fn qualifying_paths(event: &notify::Event, ignores: &IgnoreSet) -> Vec<PathBuf> {
    if !is_update(&event.kind) {
        return Vec::new();
    }
    let mut seen = FxHashSet::default();
    event
        .paths
        .iter()
        .filter(|path| !ignores.is_ignored(path) && seen.insert(path.as_path()))
        .cloned()
        .collect()
}
