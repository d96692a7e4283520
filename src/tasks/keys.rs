//! Keypress source for the dispatcher.
//!
//! A reader thread polls crossterm events while the terminal is in raw mode
//! and forwards key presses into a single-consumer channel.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tokio::sync::mpsc;

use crate::{debug, logger};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Normalize a key press into a chord such as `r` or `ctrl+c`.
///
/// Modifiers wrap the lowercase key name from the inside out: `meta+`
/// (Alt), then `ctrl+`, then `shift+`.
pub fn chord(key: &KeyEvent) -> Option<String> {
    let mut chord = match key.code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_lowercase().collect(),
        KeyCode::Enter => "return".to_string(),
        KeyCode::Esc => "escape".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::F(n) => format!("f{n}"),
        _ => return None,
    };

    if key.modifiers.contains(KeyModifiers::ALT) {
        chord = format!("meta+{chord}");
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        chord = format!("ctrl+{chord}");
    }
    if key.modifiers.contains(KeyModifiers::SHIFT) {
        chord = format!("shift+{chord}");
    }
    Some(chord)
}

/// Esc or Ctrl+C.
pub fn is_cancel(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Raw mode for the lifetime of the guard.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        logger::set_raw_mode(true);
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        logger::set_raw_mode(false);
    }
}

/// Background thread reading key presses until stopped.
pub struct KeyReader {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl KeyReader {
    pub fn spawn(tx: mpsc::UnboundedSender<KeyEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = std::thread::spawn(move || read_keys(&tx, &flag));
        Self {
            stop,
            thread: Some(thread),
        }
    }

    /// Stop polling and wait for the thread (at most one poll interval).
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for KeyReader {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_keys(tx: &mpsc::UnboundedSender<KeyEvent>, stop: &AtomicBool) {
    while !stop.load(Ordering::SeqCst) {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if tx.send(key).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("keys"; "read failed: {}", e);
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                debug!("keys"; "poll failed: {}", e);
                break;
            }
        }
    }
    debug!("keys"; "reader stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(chord(&key(KeyCode::Char('q'), KeyModifiers::NONE)).as_deref(), Some("q"));
        assert_eq!(chord(&key(KeyCode::Enter, KeyModifiers::NONE)).as_deref(), Some("return"));
        assert_eq!(chord(&key(KeyCode::Insert, KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_modifiers() {
        assert_eq!(
            chord(&key(KeyCode::Char('r'), KeyModifiers::CONTROL)).as_deref(),
            Some("ctrl+r")
        );
        assert_eq!(
            chord(&key(KeyCode::Char('R'), KeyModifiers::SHIFT)).as_deref(),
            Some("shift+r")
        );
        assert_eq!(
            chord(&key(
                KeyCode::Char('x'),
                KeyModifiers::ALT | KeyModifiers::CONTROL | KeyModifiers::SHIFT
            ))
            .as_deref(),
            Some("shift+ctrl+meta+x")
        );
    }

    #[test]
    fn test_cancel_keys() {
        assert!(is_cancel(&key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_cancel(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_cancel(&key(KeyCode::Char('c'), KeyModifiers::NONE)));
    }
}
