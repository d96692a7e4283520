//! Worker Supervisor - owns the single live solution process.
//!
//! ```text
//! Idle ──create──▶ Starting ──spawned──▶ Running ──exit 0 / delete──▶ Exited
//!   ▲                  │                    │                           │
//!   │                  └──spawn error───────┴──exit != 0──▶ Crashed     │
//!   └──────────────── create / delete reaps the terminal handle ◀───────┘
//! ```
//!
//! `create` always runs `delete` first, and `delete` awaits the monitor task
//! until the child is reaped, so two live handles never coexist.
//!
//! Only plain runs publish timings to the result slot. `create` empties the
//! slot, so after a `--test` or `--bench` run it stays empty until the next
//! plain run finishes.


use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::core::TaskSelector;
use crate::runner::results::{ResultSlot, parse_results};
use crate::utils::exec::Cmd;
use crate::{debug, log, logger};

/// How long output may keep flowing after the solution exited. A background
/// process it left behind can hold the pipes open indefinitely.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Lifecycle of one execution unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Starting,
    Running,
    Crashed,
    Exited,
}

impl WorkerState {
    /// The process is (or is about to be) alive.
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }
}

/// Reference to one execution unit and the task monitoring it.
struct WorkerHandle {
    id: u64,
    artifact: PathBuf,
    state: Arc<Mutex<WorkerState>>,
    kill_tx: Option<oneshot::Sender<()>>,
    monitor: JoinHandle<()>,
}

/// Owns at most one live [`WorkerHandle`].
pub struct WorkerSupervisor {
    /// Absolute path of the puzzle input, passed as `--input=<path>`.
    input: PathBuf,
    results: ResultSlot,
    current: Option<WorkerHandle>,
    next_id: u64,
}

impl WorkerSupervisor {
    pub fn new(input: PathBuf, results: ResultSlot) -> Self {
        Self {
            input,
            results,
            current: None,
            next_id: 0,
        }
    }

    /// Current state; `Idle` when no handle is held.
    pub fn state(&self) -> WorkerState {
        self.current
            .as_ref()
            .map_or(WorkerState::Idle, |h| *h.state.lock())
    }

    /// Artifact the current handle was started from.
    #[cfg(test)]
    pub fn artifact(&self) -> Option<&Path> {
        self.current.as_ref().map(|h| h.artifact.as_path())
    }

    /// Terminate any previous unit, then start `artifact`.
    ///
    /// Spawn failures are logged and leave the supervisor idle.
    pub async fn create(&mut self, artifact: &Path, task: Option<TaskSelector>) {
        self.delete().await;
        *self.results.lock() = None;

        self.next_id += 1;
        let id = self.next_id;
        let state = Arc::new(Mutex::new(WorkerState::Starting));

        let mut cmd = Cmd::new(artifact).arg(format!("--input={}", self.input.display()));
        if let Some(task) = task {
            cmd = cmd.arg(task.flag());
        }
        if let Some(dir) = self.input.parent() {
            cmd = cmd.cwd(dir);
        }
        debug!("worker"; "#{} starting: {}", id, cmd.display());

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                *state.lock() = WorkerState::Crashed;
                log!("worker:error"; "{:#}", e);
                return;
            }
        };
        *state.lock() = WorkerState::Running;

        let (kill_tx, kill_rx) = oneshot::channel();
        let monitor = tokio::spawn(monitor(
            id,
            child,
            Arc::clone(&state),
            kill_rx,
            task.is_none().then(|| Arc::clone(&self.results)),
        ));

        self.current = Some(WorkerHandle {
            id,
            artifact: artifact.to_path_buf(),
            state,
            kill_tx: Some(kill_tx),
            monitor,
        });
    }

    /// Terminate and reap the current unit. No-op when there is none.
    pub async fn delete(&mut self) {
        let Some(mut handle) = self.current.take() else {
            return;
        };

        if let Some(tx) = handle.kill_tx.take() {
            // Err means the monitor already finished
            let _ = tx.send(());
        }
        if let Err(e) = handle.monitor.await {
            debug!("worker"; "#{} monitor ended abnormally: {}", handle.id, e);
        }
        debug!("worker"; "#{} reaped ({})", handle.id, handle.artifact.display());
    }

    #[cfg(test)]
    fn state_cell(&self) -> Option<Arc<Mutex<WorkerState>>> {
        self.current.as_ref().map(|h| Arc::clone(&h.state))
    }
}

/// Owns the child until it exits or the supervisor asks for termination.
///
/// Parsed results go to `results` when given.
async fn monitor(
    id: u64,
    mut child: Child,
    state: Arc<Mutex<WorkerState>>,
    kill_rx: oneshot::Receiver<()>,
    results: Option<ResultSlot>,
) {
    let started = Instant::now();
    let collected = Arc::new(Mutex::new(String::new()));
    let mut stdout = child
        .stdout
        .take()
        .map(|out| tokio::spawn(forward_stdout(out, Arc::clone(&collected))));
    let mut stderr = child.stderr.take().map(|err| tokio::spawn(forward_stderr(err)));

    tokio::select! {
        status = child.wait() => {
            let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
                if let Some(task) = &mut stdout {
                    let _ = task.await;
                }
                if let Some(task) = &mut stderr {
                    let _ = task.await;
                }
            })
            .await;
            if drained.is_err() {
                debug!("worker"; "#{} output still open after exit, detaching", id);
                for task in stdout.iter().chain(stderr.iter()) {
                    task.abort();
                }
            }
            let output = std::mem::take(&mut *collected.lock());

            match status {
                Ok(status) if status.success() => {
                    report(&output, started, results.as_ref());
                    *state.lock() = WorkerState::Exited;
                }
                Ok(status) => {
                    *state.lock() = WorkerState::Crashed;
                    logger::status_error("solution crashed", &status.to_string());
                }
                Err(e) => {
                    *state.lock() = WorkerState::Crashed;
                    log!("worker:error"; "failed to wait for solution: {}", e);
                }
            }
        }
        _ = kill_rx => {
            if let Some(task) = &stdout {
                task.abort();
            }
            if let Some(task) = &stderr {
                task.abort();
            }
            if let Err(e) = child.kill().await {
                debug!("worker"; "#{} kill failed: {}", id, e);
            }
            *state.lock() = WorkerState::Exited;
            debug!("worker"; "#{} terminated", id);
        }
    }
}

/// Print solution stdout as it arrives and keep a copy for result parsing.
async fn forward_stdout(out: impl AsyncRead + Unpin, collected: Arc<Mutex<String>>) {
    let mut lines = BufReader::new(out).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        logger::raw(&line);
        let mut collected = collected.lock();
        collected.push_str(&line);
        collected.push('\n');
    }
}

async fn forward_stderr(err: impl AsyncRead + Unpin) {
    let mut lines = BufReader::new(err).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        log!("worker:stderr"; "{}", line);
    }
}

/// Show parsed timings, or fall back to a plain completion line.
fn report(output: &str, started: Instant, results: Option<&ResultSlot>) {
    let parsed = parse_results(output);
    match parsed.value() {
        Some(parsed) => {
            logger::status_success(&parsed.to_string());
            if let Some(results) = results {
                *results.lock() = Some(parsed.clone());
            }
        }
        None => {
            debug!("worker"; "no results: {}", crate::core::Reasons(parsed.reasons()));
            logger::status_success(&format!(
                "solution finished in {:.3}ms",
                started.elapsed().as_secs_f64() * 1000.0
            ));
        }
    }
}
