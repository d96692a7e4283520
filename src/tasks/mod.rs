//! Hotkey tasks for the dev loop.
//!
//! ```text
//! KeyReader (thread) → TaskDispatcher ─┬→ open prompt (while a handler waits on input)
//!                                      └→ handlers for the chord (one at a time)
//! ```
//!
//! One handler invocation is in flight at most. Keys pressed meanwhile go to
//! the prompt it opened, or are dropped.

pub mod builtin;
pub mod keys;
pub mod legend;
pub mod prompt;

#[cfg(test)]
mod tests;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crossterm::event::KeyEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{debug, log};
use legend::Legend;
use prompt::Prompter;

pub type TaskFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
pub type TaskHandler<C> = Arc<dyn Fn(C) -> TaskFuture + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskColor {
    Red,
    Green,
    Cyan,
    Yellow,
    Magenta,
}

/// A hotkey-bound action.
pub struct Task<C> {
    /// Chords that trigger the task, e.g. `q` or `ctrl+c`
    pub keys: Vec<&'static str>,
    pub label: &'static str,
    pub color: TaskColor,
    /// Hidden from the legend and never triggered
    pub disabled: bool,
    pub handler: TaskHandler<C>,
}

impl<C: 'static> Task<C> {
    pub fn new<F, Fut>(keys: &[&'static str], label: &'static str, color: TaskColor, f: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            keys: keys.to_vec(),
            label,
            color,
            disabled: false,
            handler: Arc::new(move |ctx| -> TaskFuture { Box::pin(f(ctx)) }),
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Tasks in registration order.
pub struct TaskRegistry<C> {
    tasks: Vec<Task<C>>,
}

impl<C> Default for TaskRegistry<C> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<C> TaskRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, task: Task<C>) {
        self.tasks.push(task);
    }

    pub fn tasks(&self) -> &[Task<C>] {
        &self.tasks
    }

    /// Handlers of every enabled task bound to `chord`, in registration order.
    pub fn handlers_for(&self, chord: &str) -> Vec<TaskHandler<C>> {
        self.tasks
            .iter()
            .filter(|task| !task.disabled && task.keys.iter().any(|key| *key == chord))
            .map(|task| Arc::clone(&task.handler))
            .collect()
    }
}

/// Routes keypresses to tasks, one invocation at a time.
pub struct TaskDispatcher<C> {
    registry: TaskRegistry<C>,
    context: C,
    prompter: Prompter,
    legend: Legend,
    in_flight: Option<JoinHandle<()>>,
}

impl<C> TaskDispatcher<C>
where
    C: Clone + Send + 'static,
{
    /// `prompter` must be the one handlers reach through `context`.
    pub fn new(registry: TaskRegistry<C>, context: C, prompter: Prompter) -> Self {
        Self {
            registry,
            context,
            prompter,
            legend: Legend::new(),
            in_flight: None,
        }
    }

    /// Consume keys until the sender side closes.
    pub async fn run(mut self, mut keys: mpsc::UnboundedReceiver<KeyEvent>) {
        self.legend.render(self.registry.tasks());
        loop {
            tokio::select! {
                key = keys.recv() => match key {
                    Some(key) => self.on_key(key),
                    None => break,
                },
                () = settle(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.legend.render(self.registry.tasks());
                }
            }
        }
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        debug!("task"; "dispatcher stopped");
    }

    /// Handle one keypress.
    pub fn on_key(&mut self, key: KeyEvent) {
        if self.in_flight.as_ref().is_some_and(JoinHandle::is_finished) {
            self.in_flight = None;
        }

        if self.in_flight.is_some() {
            if !self.prompter.forward(key) {
                debug!("task"; "busy, ignoring {:?}", key.code);
            }
            return;
        }

        let Some(chord) = keys::chord(&key) else {
            return;
        };
        let handlers = self.registry.handlers_for(&chord);
        if handlers.is_empty() {
            self.legend.render(self.registry.tasks());
            return;
        }

        let context = self.context.clone();
        self.in_flight = Some(tokio::spawn(async move {
            for handler in handlers {
                if let Err(e) = (*handler)(context.clone()).await {
                    log!("error"; "error while handling hotkey [{}]: {:#}", chord, e);
                }
            }
        }));
    }
}

/// Resolves when the in-flight invocation finishes; pends forever when idle.
async fn settle(task: &mut Option<JoinHandle<()>>) {
    match task {
        Some(handle) => {
            if let Err(e) = handle.await
                && e.is_panic()
            {
                log!("error"; "hotkey handler panicked");
            }
        }
        None => std::future::pending().await,
    }
}
