use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::actor::messages::{ControlMsg, ReloadMsg};
use crate::actor::reload::ReloadActor;
use crate::actor::watch::{WatchActor, WatchSession};
use crate::runner::Runner;
use crate::tasks::builtin::SessionContext;
use crate::tasks::keys::{KeyReader, RawModeGuard};
use crate::tasks::prompt::Prompter;
use crate::tasks::{TaskDispatcher, TaskRegistry};
use crate::{debug, log};

/// A wired-up session, ready to run.
pub(super) struct Session {
    pub watch: WatchSession,
    pub watch_actor: WatchActor,
    pub reload_actor: ReloadActor,
    pub reload_tx: mpsc::UnboundedSender<ReloadMsg>,
    pub control_rx: mpsc::UnboundedReceiver<ControlMsg>,
    pub runner: Arc<Mutex<Runner>>,
    pub tasks: TaskRegistry<SessionContext>,
    pub context: SessionContext,
    pub prompter: Prompter,
    pub interactive: bool,
    pub shutdown_rx: Option<mpsc::UnboundedReceiver<()>>,
}

impl Session {
    /// Run all actors until the session ends, then release everything it
    /// holds: keyboard, watcher subscription, pending reloads, worker.
    pub async fn run(self) -> Result<()> {
        let Self {
            watch,
            watch_actor,
            reload_actor,
            reload_tx,
            mut control_rx,
            runner,
            tasks,
            context,
            prompter,
            interactive,
            shutdown_rx,
        } = self;

        let watch_handle = tokio::spawn(watch_actor.run());
        let reload_handle = tokio::spawn(reload_actor.run());
        let keyboard = if interactive {
            Keyboard::start(tasks, context, prompter)
        } else {
            None
        };

        let _ = reload_tx.send(ReloadMsg::Reload(None));

        let outcome = tokio::select! {
            msg = control_rx.recv() => match msg {
                Some(ControlMsg::WatchFailed(e)) => Err(anyhow!("file watcher failed: {}", e)),
                Some(ControlMsg::Quit) | None => Ok(()),
            },
            () = shutdown_signal(shutdown_rx) => {
                debug!("dev"; "shutdown signal received");
                Ok(())
            }
        };

        if let Some(keyboard) = keyboard {
            keyboard.stop().await;
        }
        watch_handle.abort();
        watch.unwatch();

        // Dropping an in-flight reload kills its child processes.
        reload_handle.abort();
        let _ = reload_handle.await;
        runner.lock().await.dispose().await;

        log!("dev"; "session closed");
        outcome
    }
}

/// Raw-mode key input feeding the task dispatcher.
struct Keyboard {
    reader: KeyReader,
    dispatcher: JoinHandle<()>,
    _raw: RawModeGuard,
}

impl Keyboard {
    fn start(
        tasks: TaskRegistry<SessionContext>,
        context: SessionContext,
        prompter: Prompter,
    ) -> Option<Self> {
        let raw = match RawModeGuard::enable() {
            Ok(raw) => raw,
            Err(e) => {
                log!("warning"; "hotkeys unavailable: {}", e);
                return None;
            }
        };

        let (keys_tx, keys_rx) = mpsc::unbounded_channel();
        let reader = KeyReader::spawn(keys_tx);
        let dispatcher = TaskDispatcher::new(tasks, context, prompter);
        Some(Self {
            reader,
            dispatcher: tokio::spawn(dispatcher.run(keys_rx)),
            _raw: raw,
        })
    }

    /// Stopping the reader closes the key channel, which ends the dispatcher.
    async fn stop(mut self) {
        self.reader.stop();
        let _ = self.dispatcher.await;
    }
}

async fn shutdown_signal(rx: Option<mpsc::UnboundedReceiver<()>>) {
    match rx {
        Some(mut rx) => {
            rx.recv().await;
        }
        None => std::future::pending().await,
    }
}
