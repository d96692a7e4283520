//! Reload Actor - debounced access to the session runner.
//!
//! Watch events and the reload/test/bench hotkeys all arrive here. Requests
//! are coalesced by the debounce, and a rebuild runs to completion before
//! the next one starts; anything requested meanwhile becomes one trailing
//! reload.
//!
//! A run in progress can be stopped through the shared `stop` signal; the
//! dropped run kills its child processes and releases the runner.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify, mpsc};

use super::debounce;
use super::messages::ReloadMsg;
use crate::runner::Runner;
use crate::{debug, log};

pub struct ReloadActor {
    rx: mpsc::UnboundedReceiver<ReloadMsg>,
    runner: Arc<Mutex<Runner>>,
    window: Duration,
    stop: Arc<Notify>,
}

impl ReloadActor {
    pub fn new(
        rx: mpsc::UnboundedReceiver<ReloadMsg>,
        runner: Arc<Mutex<Runner>>,
        window: Duration,
        stop: Arc<Notify>,
    ) -> Self {
        Self {
            rx,
            runner,
            window,
            stop,
        }
    }

    pub async fn run(self) {
        let runner = self.runner;
        let stop = self.stop;
        debounce::drive(self.rx, self.window, |msg| {
            let runner = Arc::clone(&runner);
            let stop = Arc::clone(&stop);
            async move {
                let ReloadMsg::Reload(task) = msg;
                let stopped = stop.notified();
                tokio::select! {
                    status = async { runner.lock().await.reload(task).await } => {
                        debug!("reload"; "{:?}", status);
                    }
                    () = stopped => log!("reload"; "run stopped"),
                }
            }
        })
        .await;
        debug!("reload"; "stopped");
    }
}
