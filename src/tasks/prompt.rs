//! Interactive prompts for hotkey handlers.
//!
//! Prompts do not read the terminal themselves. While one is open, the
//! dispatcher forwards every keypress into it through a shared sink, so the
//! key reader stays the single consumer of terminal input.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::keys::is_cancel;
use crate::logger;

type Sink = Arc<Mutex<Option<mpsc::UnboundedSender<KeyEvent>>>>;

/// Outcome of feeding one key into a prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum Step<T> {
    Pending,
    Done(T),
}

/// A prompt as a key-driven state machine.
pub trait Prompt {
    type Output;

    fn on_key(&mut self, key: &KeyEvent) -> Step<Self::Output>;

    /// Current rendering, possibly several lines.
    fn view(&self) -> String;

    /// One line left behind once answered.
    fn summary(&self) -> String;
}

/// Opens prompts and routes keys into the open one.
#[derive(Clone, Default)]
pub struct Prompter {
    sink: Sink,
}

impl Prompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand `key` to the open prompt. Returns false when none is open.
    pub fn forward(&self, key: KeyEvent) -> bool {
        self.sink
            .lock()
            .as_ref()
            .is_some_and(|tx| tx.send(key).is_ok())
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.sink.lock().is_some()
    }

    /// Run `prompt` until answered. `None` on Esc, Ctrl+C, or when the key
    /// source goes away.
    pub async fn ask<P: Prompt>(&self, mut prompt: P) -> Option<P::Output> {
        let mut session = self.open();
        let mut lines = 0;

        loop {
            let view = prompt.view();
            logger::clear_lines_above(lines);
            logger::raw(&view);
            lines = view.split('\n').count();

            let key = session.rx.recv().await?;
            if is_cancel(&key) {
                logger::clear_lines_above(lines);
                return None;
            }
            if let Step::Done(value) = prompt.on_key(&key) {
                logger::clear_lines_above(lines);
                logger::raw(&prompt.summary());
                return Some(value);
            }
        }
    }

    pub async fn select<T: Clone>(&self, message: &str, options: Vec<(String, T)>) -> Option<T> {
        self.ask(Select::new(message, options)).await
    }

    pub async fn text<V>(&self, message: &str, validate: V) -> Option<String>
    where
        V: Fn(&str) -> Option<&'static str>,
    {
        self.ask(TextInput::new(message, validate)).await
    }

    pub async fn confirm(&self, message: &str) -> Option<bool> {
        self.ask(Confirm::new(message)).await
    }

    fn open(&self) -> Session {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.sink.lock() = Some(tx);
        Session {
            rx,
            sink: Arc::clone(&self.sink),
        }
    }
}

/// Receiving end of an open prompt; closes the sink on drop.
struct Session {
    rx: mpsc::UnboundedReceiver<KeyEvent>,
    sink: Sink,
}

impl Drop for Session {
    fn drop(&mut self) {
        *self.sink.lock() = None;
    }
}

fn header(message: &str) -> String {
    format!("{} {}", "◆".cyan(), message.bold())
}

fn answered(message: &str, answer: &str) -> String {
    format!("{} {} {}", "◇".green(), message, answer.dimmed())
}

// ============================================================================
// Select
// ============================================================================

pub struct Select<T> {
    message: String,
    options: Vec<(String, T)>,
    cursor: usize,
}

impl<T: Clone> Select<T> {
    pub fn new(message: &str, options: Vec<(String, T)>) -> Self {
        Self {
            message: message.to_string(),
            options,
            cursor: 0,
        }
    }
}

impl<T: Clone> Prompt for Select<T> {
    type Output = T;

    fn on_key(&mut self, key: &KeyEvent) -> Step<T> {
        let len = self.options.len();
        if len == 0 {
            return Step::Pending;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor = (self.cursor + len - 1) % len,
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                self.cursor = (self.cursor + 1) % len;
            }
            KeyCode::Enter => return Step::Done(self.options[self.cursor].1.clone()),
            _ => {}
        }
        Step::Pending
    }

    fn view(&self) -> String {
        let mut out = header(&self.message);
        for (i, (label, _)) in self.options.iter().enumerate() {
            if i == self.cursor {
                out.push_str(&format!("\n  {} {}", "●".green(), label));
            } else {
                out.push_str(&format!("\n  {} {}", "○".dimmed(), label.dimmed()));
            }
        }
        out
    }

    fn summary(&self) -> String {
        let label = self.options.get(self.cursor).map_or("", |(l, _)| l.as_str());
        answered(&self.message, label)
    }
}

// ============================================================================
// Text
// ============================================================================

/// Free text with a validator; a failed validation keeps the prompt open.
pub struct TextInput<V> {
    message: String,
    value: String,
    error: Option<&'static str>,
    validate: V,
}

impl<V> TextInput<V>
where
    V: Fn(&str) -> Option<&'static str>,
{
    pub fn new(message: &str, validate: V) -> Self {
        Self {
            message: message.to_string(),
            value: String::new(),
            error: None,
            validate,
        }
    }
}

impl<V> Prompt for TextInput<V>
where
    V: Fn(&str) -> Option<&'static str>,
{
    type Output = String;

    fn on_key(&mut self, key: &KeyEvent) -> Step<String> {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.push(c);
                self.error = None;
            }
            KeyCode::Backspace => {
                self.value.pop();
                self.error = None;
            }
            KeyCode::Enter => match (self.validate)(&self.value) {
                Some(error) => self.error = Some(error),
                None => return Step::Done(self.value.clone()),
            },
            _ => {}
        }
        Step::Pending
    }

    fn view(&self) -> String {
        let mut out = format!("{}\n{} {}", header(&self.message), "│".cyan(), self.value);
        if let Some(error) = self.error {
            out.push_str(&format!("\n{} {}", "▲".yellow(), error.yellow()));
        }
        out
    }

    fn summary(&self) -> String {
        answered(&self.message, &self.value)
    }
}

// ============================================================================
// Confirm
// ============================================================================

pub struct Confirm {
    message: String,
    value: bool,
}

impl Confirm {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            value: true,
        }
    }
}

impl Prompt for Confirm {
    type Output = bool;

    fn on_key(&mut self, key: &KeyEvent) -> Step<bool> {
        match key.code {
            KeyCode::Char('y' | 'Y') => Step::Done(true),
            KeyCode::Char('n' | 'N') => Step::Done(false),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                self.value = !self.value;
                Step::Pending
            }
            KeyCode::Enter => Step::Done(self.value),
            _ => Step::Pending,
        }
    }

    fn view(&self) -> String {
        let (yes, no) = if self.value {
            (format!("{} Yes", "●".green()), format!("{} No", "○".dimmed()))
        } else {
            (format!("{} Yes", "○".dimmed()), format!("{} No", "●".green()))
        };
        format!("{}\n  {yes} / {no}", header(&self.message))
    }

    fn summary(&self) -> String {
        answered(&self.message, if self.value { "Yes" } else { "No" })
    }
}
