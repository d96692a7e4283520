use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::{Notify, mpsc};

use super::legend::format_legend;
use super::prompt::Prompter;
use super::{Task, TaskColor, TaskDispatcher, TaskRegistry};
use crate::utils::exec::strip_ansi;

#[derive(Clone)]
struct Recorder {
    tx: mpsc::UnboundedSender<&'static str>,
    gate: Arc<Notify>,
    prompter: Prompter,
}

fn press(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn recording_tasks() -> TaskRegistry<Recorder> {
    let mut tasks = TaskRegistry::new();
    tasks.register(Task::new(&["x"], "X", TaskColor::Green, |p: Recorder| async move {
        p.tx.send("x")?;
        anyhow::Ok(())
    }));
    tasks.register(Task::new(&["w"], "Wait", TaskColor::Cyan, |p: Recorder| async move {
        p.tx.send("start")?;
        p.gate.notified().await;
        p.tx.send("end")?;
        anyhow::Ok(())
    }));
    tasks.register(Task::new(&["d"], "First", TaskColor::Yellow, |p: Recorder| async move {
        p.tx.send("d1")?;
        anyhow::Ok(())
    }));
    tasks.register(Task::new(&["d"], "Second", TaskColor::Yellow, |p: Recorder| async move {
        p.tx.send("d2")?;
        anyhow::Ok(())
    }));
    tasks.register(Task::new(&["e"], "Fail", TaskColor::Red, |_: Recorder| async move {
        Err::<(), _>(anyhow!("boom"))
    }));
    tasks.register(Task::new(&["p"], "Ask", TaskColor::Magenta, |p: Recorder| async move {
        let answer = p.prompter.confirm("ok?").await;
        p.tx.send(if answer == Some(false) { "no" } else { "yes" })?;
        anyhow::Ok(())
    }));
    tasks.register(
        Task::new(&["z"], "Hidden", TaskColor::Red, |p: Recorder| async move {
            p.tx.send("z")?;
            anyhow::Ok(())
        })
        .disabled(true),
    );
    tasks
}

async fn noop(_: ()) -> anyhow::Result<()> {
    Ok(())
}

struct Harness {
    keys: mpsc::UnboundedSender<KeyEvent>,
    events: mpsc::UnboundedReceiver<&'static str>,
    gate: Arc<Notify>,
    prompter: Prompter,
}

fn start() -> Harness {
    let (tx, events) = mpsc::unbounded_channel();
    let gate = Arc::new(Notify::new());
    let prompter = Prompter::new();
    let recorder = Recorder {
        tx,
        gate: Arc::clone(&gate),
        prompter: prompter.clone(),
    };

    let (keys, keys_rx) = mpsc::unbounded_channel();
    let dispatcher = TaskDispatcher::new(recording_tasks(), recorder, prompter.clone());
    tokio::spawn(dispatcher.run(keys_rx));
    Harness {
        keys,
        events,
        gate,
        prompter,
    }
}

impl Harness {
    async fn next(&mut self) -> &'static str {
        tokio::time::timeout(Duration::from_secs(2), self.events.recv())
            .await
            .expect("no task event within 2s")
            .expect("event channel closed")
    }

    /// Let the in-flight handler settle.
    async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    fn assert_quiet(&mut self) {
        assert!(self.events.try_recv().is_err());
    }
}

#[tokio::test]
async fn test_chord_runs_matching_task() {
    let mut h = start();
    h.keys.send(press('x')).unwrap();
    assert_eq!(h.next().await, "x");
}

#[tokio::test]
async fn test_shared_chord_runs_handlers_in_order() {
    let mut h = start();
    h.keys.send(press('d')).unwrap();
    assert_eq!(h.next().await, "d1");
    assert_eq!(h.next().await, "d2");
}

#[tokio::test]
async fn test_keys_ignored_while_busy() {
    let mut h = start();
    h.keys.send(press('w')).unwrap();
    assert_eq!(h.next().await, "start");

    h.keys.send(press('x')).unwrap();
    h.keys.send(press('w')).unwrap();
    h.settle().await;
    h.assert_quiet();

    h.gate.notify_one();
    assert_eq!(h.next().await, "end");
    h.settle().await;

    h.keys.send(press('x')).unwrap();
    assert_eq!(h.next().await, "x");
    h.settle().await;
    h.assert_quiet();
}

#[tokio::test]
async fn test_prompt_receives_keys_while_busy() {
    let mut h = start();
    h.keys.send(press('p')).unwrap();
    for _ in 0..200 {
        if h.prompter.is_open() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(h.prompter.is_open());

    // `x` is a chord, but the open prompt swallows it.
    h.keys.send(press('x')).unwrap();
    h.keys.send(press('n')).unwrap();
    assert_eq!(h.next().await, "no");
    h.settle().await;
    h.assert_quiet();
}

#[tokio::test]
async fn test_handler_error_keeps_dispatcher_alive() {
    let mut h = start();
    h.keys.send(press('e')).unwrap();
    h.settle().await;

    h.keys.send(press('x')).unwrap();
    assert_eq!(h.next().await, "x");
}

#[tokio::test]
async fn test_disabled_task_never_runs() {
    let mut h = start();
    h.keys.send(press('z')).unwrap();
    h.settle().await;
    h.assert_quiet();
}

#[test]
fn test_legend_single_line() {
    let mut tasks = TaskRegistry::<()>::new();
    tasks.register(Task::new(&["q", "ctrl+c"], "Quit", TaskColor::Red, noop));
    tasks.register(Task::new(&["r"], "Reload", TaskColor::Green, noop));
    tasks.register(
        Task::new(&["t"], "Test", TaskColor::Cyan, noop).disabled(true),
    );

    let legend = format_legend(tasks.tasks(), 200);
    assert_eq!(strip_ansi(&legend), "🦌 Press: q to Quit • r to Reload");
}

#[test]
fn test_legend_wraps_when_too_wide() {
    let mut tasks = TaskRegistry::<()>::new();
    tasks.register(Task::new(&["q"], "Quit", TaskColor::Red, noop));
    tasks.register(Task::new(&["s"], "Submit", TaskColor::Magenta, noop));

    let legend = format_legend(tasks.tasks(), 20);
    let lines: Vec<_> = legend.lines().map(|l| strip_ansi(l).into_owned()).collect();
    assert_eq!(lines, ["🦌 Press: ", " • q to Quit", " • s to Submit"]);
}
