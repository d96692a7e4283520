//! Actor Coordinator - wires up one dev-loop session.
//!
//! The Coordinator is a thin orchestrator that:
//! - Resolves the day's runner and makes sure the input is present
//! - Subscribes the watcher and creates the channels between actors
//! - Runs them until quit, Ctrl+C or a watcher failure, then tears down

mod input;
mod runtime;

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use parking_lot::Mutex as SyncMutex;
use tokio::sync::{Mutex, Notify, mpsc};

use super::reload::ReloadActor;
use super::watch::{IgnoreSet, WatchSession, filter};
use crate::aoc::{AocClient, PuzzleClient};
use crate::config::KitConfig;
use crate::runner::{DayPaths, ResultSlot, Runner, RunnerKind};
use crate::store::DataStore;
use crate::tasks::builtin::{self, SessionContext};
use crate::tasks::prompt::Prompter;
use crate::utils::path::{display_relative, normalize_path};
use crate::{debug, log};
use runtime::Session;

/// Coordinator - wires up and runs a dev-loop session.
pub struct Coordinator {
    config: KitConfig,
    year: u16,
    day: u8,
    client: Option<Arc<dyn PuzzleClient>>,
    interactive: bool,
    shutdown_rx: Option<mpsc::UnboundedReceiver<()>>,
}

impl Coordinator {
    pub fn new(config: KitConfig, year: u16, day: u8) -> Self {
        Self {
            config,
            year,
            day,
            client: None,
            interactive: std::io::stdin().is_terminal(),
            shutdown_rx: None,
        }
    }

    /// Use `client` instead of the HTTP client built from `[client]`.
    pub fn with_client(mut self, client: Arc<dyn PuzzleClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Read hotkeys from the terminal. Defaults to whether stdin is a TTY.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: mpsc::UnboundedReceiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the session until it ends. Only a watcher failure is an error.
    pub async fn run(self) -> Result<()> {
        self.prepare().await?.run().await
    }

    /// Resolve the day, fetch its input and wire the actors, without
    /// starting any of them.
    async fn prepare(self) -> Result<Session> {
        let mut config = self.config;
        // The watcher reports canonical paths.
        let root = normalize_path(config.get_root());
        config.set_root(&root);
        let paths = DayPaths::new(&config, self.year, self.day);
        if !paths.dir.is_dir() {
            bail!(
                "day directory {} does not exist",
                display_relative(&paths.dir, &root)
            );
        }

        let store = DataStore::new(&root);
        let data = store.load(self.year)?;
        let kind = RunnerKind::resolve(&config, &data, self.day);

        let gitignore = filter::gitignore_lines(&root);
        input::warn_unignored_input(&gitignore);

        let client: Arc<dyn PuzzleClient> = match self.client {
            Some(client) => client,
            None => Arc::new(AocClient::new(&config.client)?),
        };
        input::ensure_input(client.as_ref(), &paths).await;

        let results: ResultSlot = Arc::new(SyncMutex::new(None));
        let runner = Runner::new(&kind, &config, paths.clone(), Arc::clone(&results))?;
        let exec = runner.exec();
        let runner = Arc::new(Mutex::new(runner));

        let (reload_tx, reload_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let mut patterns = gitignore;
        patterns.extend(config.dev.ignore.iter().cloned());
        let ignores = IgnoreSet::new(&paths.dir, &patterns);
        let (watch, watch_actor) = WatchSession::start(
            &paths.dir,
            ignores,
            &root,
            reload_tx.clone(),
            control_tx.clone(),
        )?;

        let stop_run = Arc::new(Notify::new());
        let reload_actor = ReloadActor::new(
            reload_rx,
            Arc::clone(&runner),
            Duration::from_millis(config.dev.debounce_ms),
            Arc::clone(&stop_run),
        );

        let prompter = Prompter::new();
        let context = SessionContext {
            year: self.year,
            day: self.day,
            year_dir: config.year_dir(self.year),
            runner: Arc::clone(&runner),
            stop_run,
            results,
            store,
            client,
            prompter: prompter.clone(),
            reload_tx: reload_tx.clone(),
            control_tx,
        };

        log!(
            "dev";
            "{} day {} with the {} runner, listening for changes...",
            self.year,
            self.day,
            kind.name()
        );
        debug!("dev"; "watching {}", paths.dir.display());

        Ok(Session {
            watch,
            watch_actor,
            reload_actor,
            reload_tx,
            control_rx,
            runner,
            tasks: builtin::registry(exec),
            context,
            prompter,
            interactive: self.interactive,
            shutdown_rx: self.shutdown_rx,
        })
    }
}

#[cfg(all(test, unix))]
mod tests;
