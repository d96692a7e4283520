//! The dev loop's hotkeys: quit, reload, test, bench and submit.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use owo_colors::OwoColorize;
use tokio::sync::{Mutex, Notify, mpsc};

use super::prompt::Prompter;
use super::{Task, TaskColor, TaskRegistry};
use crate::actor::messages::{ControlMsg, ReloadMsg};
use crate::aoc::PuzzleClient;
use crate::core::{Outcome, Part, Reasons, TaskSelector};
use crate::runner::{ResultSlot, Runner};
use crate::store::{DataStore, readme};
use crate::{log, logger};

const MAX_SOLUTION_LEN: usize = 100;

/// How long submit waits for a stopped run to release the runner.
const RUNNER_RELEASE_TIMEOUT: Duration = Duration::from_secs(2);

/// Everything a hotkey handler may touch.
#[derive(Clone)]
pub struct SessionContext {
    pub year: u16,
    pub day: u8,
    pub year_dir: PathBuf,
    pub runner: Arc<Mutex<Runner>>,
    /// Stops the reload actor's run in progress
    pub stop_run: Arc<Notify>,
    pub results: ResultSlot,
    pub store: DataStore,
    pub client: Arc<dyn PuzzleClient>,
    pub prompter: Prompter,
    pub reload_tx: mpsc::UnboundedSender<ReloadMsg>,
    pub control_tx: mpsc::UnboundedSender<ControlMsg>,
}

/// The standard task list. Test and bench are disabled for runners that
/// cannot honor task selectors.
pub fn registry(exec: bool) -> TaskRegistry<SessionContext> {
    let mut tasks = TaskRegistry::new();
    tasks.register(Task::new(&["q", "ctrl+c"], "Quit", TaskColor::Red, quit));
    tasks.register(Task::new(&["r"], "Reload", TaskColor::Green, |ctx| {
        request(ctx, None)
    }));
    tasks.register(
        Task::new(&["t"], "Test", TaskColor::Cyan, |ctx| {
            request(ctx, Some(TaskSelector::Test))
        })
        .disabled(exec),
    );
    tasks.register(
        Task::new(&["b"], "Bench", TaskColor::Yellow, |ctx| {
            request(ctx, Some(TaskSelector::Bench))
        })
        .disabled(exec),
    );
    tasks.register(Task::new(&["s"], "Submit", TaskColor::Magenta, submit));
    tasks
}

async fn quit(ctx: SessionContext) -> Result<()> {
    log!("dev"; "exiting");
    ctx.control_tx.send(ControlMsg::Quit)?;
    Ok(())
}

async fn request(ctx: SessionContext, task: Option<TaskSelector>) -> Result<()> {
    match task {
        Some(task) => log!("dev"; "running {}", task),
        None => log!("dev"; "reloading"),
    }
    ctx.reload_tx.send(ReloadMsg::Reload(task))?;
    Ok(())
}

/// Reject empty or overlong answers.
pub fn validate_solution(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        Some("Solution cannot be empty!")
    } else if value.chars().count() > MAX_SOLUTION_LEN {
        Some("Solution cannot be longer than 100 characters!")
    } else {
        None
    }
}

async fn submit(ctx: SessionContext) -> Result<()> {
    // The worker would interleave its output with the prompts. An inline
    // run holds the runner until it ends, so stop it first.
    ctx.stop_run.notify_waiters();
    {
        let Ok(mut runner) = tokio::time::timeout(RUNNER_RELEASE_TIMEOUT, ctx.runner.lock()).await
        else {
            logger::status_warning("a run is still in progress, submission cancelled");
            return Ok(());
        };
        if runner.worker_state().is_live() {
            log!("submit"; "stopping the running solution");
        }
        runner.dispose().await;
    }

    let parts = vec![("Part 1".to_string(), Part::One), ("Part 2".to_string(), Part::Two)];
    let Some(part) = ctx.prompter.select("Select a part to submit", parts).await else {
        log!("submit"; "submission cancelled");
        return Ok(());
    };

    let message = format!("Enter your solution for part {part}");
    let Some(solution) = ctx.prompter.text(&message, validate_solution).await else {
        log!("submit"; "submission cancelled");
        return Ok(());
    };

    let message = format!("Submit \"{}\" for part {part}?", solution.dimmed());
    if ctx.prompter.confirm(&message).await != Some(true) {
        log!("submit"; "submission cancelled");
        return Ok(());
    }

    submit_answer(&ctx, part, &solution).await
}

/// Send the answer; only an accepted one touches persisted state.
async fn submit_answer(ctx: &SessionContext, part: Part, solution: &str) -> Result<()> {
    log!("submit"; "submitting solution...");
    match ctx.client.submit(ctx.year, ctx.day, part, solution).await {
        Outcome::Ok { value: true } => {
            logger::status_success(&format!("day {} part {part} solved!", ctx.day));
            record_solved(ctx, part, solution)
        }
        Outcome::Ok { value: false } => {
            logger::status_error("That's not the right answer", "");
            Ok(())
        }
        Outcome::Err { reasons } => {
            logger::status_error("couldn't submit solution", &Reasons(&reasons).to_string());
            Ok(())
        }
    }
}

fn record_solved(ctx: &SessionContext, part: Part, solution: &str) -> Result<()> {
    let time = ctx.results.lock().as_ref().map(|r| r.part(part).time);

    let mut data = ctx.store.load(ctx.year)?;
    data.record_solved(ctx.day, part, solution, time);
    ctx.store.save(ctx.year, &data)?;
    readme::update(&ctx.year_dir, &data)?;
    Ok(())
}
