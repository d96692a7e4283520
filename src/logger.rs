//! Logging utilities with colored output and status display.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro for output that only shows up with `--verbose`
//! - `StatusLine` for timestamped success/error/warning lines in the dev loop
//!
//! # Example
//!
//! ```ignore
//! log!("watch"; "change: {}", path.display());
//! logger::status_error("build failed", &stderr);
//! ```
//!
//! The dev loop puts the terminal into raw mode to read single keypresses.
//! Raw mode disables output post-processing, so every line written here
//! ends with `\r\n` while raw mode is active.

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set when the terminal is in raw mode (line endings need `\r`)
static RAW_MODE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Bumped on every write; lets the legend tell whether it is still the
/// last thing on screen.
static WRITES: AtomicUsize = AtomicUsize::new(0);

/// Current output generation.
pub fn output_mark() -> usize {
    WRITES.load(Ordering::SeqCst)
}

#[inline]
fn mark_written() {
    WRITES.fetch_add(1, Ordering::SeqCst);
}

/// Record raw-mode state so output keeps lining up.
pub fn set_raw_mode(raw: bool) {
    RAW_MODE.store(raw, Ordering::SeqCst);
}

/// Line terminator for the current terminal mode.
#[inline]
pub fn eol() -> &'static str {
    if RAW_MODE.load(Ordering::SeqCst) {
        "\r\n"
    } else {
        "\n"
    }
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();

    let eol = eol();
    for line in message.split('\n') {
        write!(stdout, "{prefix} {line}{eol}").ok();
    }

    stdout.flush().ok();
    mark_written();
}

/// Write lines verbatim (solution output), honoring raw-mode line endings.
pub fn raw(text: &str) {
    let mut stdout = stdout().lock();
    let eol = eol();
    for line in text.split('\n') {
        write!(stdout, "{line}{eol}").ok();
    }
    stdout.flush().ok();
    mark_written();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "dev" | "task" => prefix.bright_blue().bold().to_string(),
        "watch" => prefix.bright_green().bold().to_string(),
        "submit" => prefix.bright_magenta().bold().to_string(),
        m if m == "error" || m.ends_with(":error") || m.ends_with(":stderr") => {
            prefix.bright_red().bold().to_string()
        }
        "warning" => prefix.yellow().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Status Line (timestamped build/run outcomes)
// ============================================================================

/// Get current time formatted as HH:MM:SS (UTC)
fn now() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Timestamped status output for the dev loop
///
/// Unlike a build-progress display, dev-loop statuses are never
/// overwritten: solution output is interleaved between them, so every
/// status stays in the scrollback.
///
/// # Example
///
/// ```ignore
/// let mut status = StatusLine::new();
/// status.success("build finished in 0.8s");
/// status.error("build failed", "error[E0425]: cannot find value `x`");
/// ```
pub struct StatusLine {
    /// Number of status lines printed so far
    printed: usize,
}

/// Global status display shared by the runner, worker and task subsystems.
static STATUS: LazyLock<Mutex<StatusLine>> = LazyLock::new(|| Mutex::new(StatusLine::new()));

impl StatusLine {
    /// Create a new status display.
    pub const fn new() -> Self {
        Self { printed: 0 }
    }

    /// Display success message (✓ prefix, green).
    pub fn success(&mut self, message: &str) {
        self.display(format!("{}", "✓".green()), message);
    }

    /// Display error message (✗ prefix, red) with optional detail.
    pub fn error(&mut self, summary: &str, detail: &str) {
        let message = if detail.is_empty() {
            summary.to_string()
        } else {
            format!("{summary}\n{detail}")
        };
        self.display(format!("{}", "✗".red()), &message);
    }

    /// Display warning message (⚠ prefix, yellow).
    pub fn warning(&mut self, detail: &str) {
        self.display(format!("{}", "⚠".yellow()), detail);
    }

    fn display(&mut self, symbol: String, message: &str) {
        let timestamp = format!("[{}]", now()).dimmed().to_string();
        let line = format!("{timestamp} {symbol} {message}");

        let mut stdout = stdout().lock();
        let eol = eol();
        for part in line.split('\n') {
            write!(stdout, "{part}{eol}").ok();
        }
        stdout.flush().ok();
        mark_written();

        self.printed += 1;
    }
}

/// Global status: success
pub fn status_success(message: &str) {
    STATUS.lock().success(message);
}

/// Global status: error
pub fn status_error(summary: &str, detail: &str) {
    STATUS.lock().error(summary, detail);
}

/// Global status: warning
pub fn status_warning(detail: &str) {
    STATUS.lock().warning(detail);
}

/// Clear `lines` lines above the cursor (used by the hotkey legend).
#[allow(clippy::cast_possible_truncation)]
pub fn clear_lines_above(lines: usize) {
    if lines == 0 {
        return;
    }
    let mut stdout = stdout().lock();
    execute!(
        stdout,
        cursor::MoveUp(lines as u16),
        cursor::MoveToColumn(0),
        Clear(ClearType::FromCursorDown)
    )
    .ok();
    stdout.flush().ok();
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_new() {
        let status = StatusLine::new();
        assert_eq!(status.printed, 0);
    }

    #[test]
    fn test_status_line_counts_displays() {
        let mut status = StatusLine::new();
        status.success("built");
        status.warning("input.txt missing");
        assert_eq!(status.printed, 2);
    }

    #[test]
    fn test_eol_follows_raw_mode() {
        set_raw_mode(true);
        assert_eq!(eol(), "\r\n");
        set_raw_mode(false);
        assert_eq!(eol(), "\n");
    }

    #[test]
    fn test_writes_advance_output_mark() {
        let before = output_mark();
        raw("");
        assert!(output_mark() > before);
    }

    #[test]
    fn test_prefix_colors_error_tags() {
        use crate::utils::exec::strip_ansi;

        let stderr = colorize_prefix("worker:stderr", "worker:stderr");
        assert_eq!(strip_ansi(&stderr), "[worker:stderr]");
        assert_eq!(stderr, "[worker:stderr]".bright_red().bold().to_string());
        assert_eq!(
            colorize_prefix("build:error", "build:error"),
            "[build:error]".bright_red().bold().to_string()
        );
        assert_eq!(
            colorize_prefix("watch", "watch"),
            "[watch]".bright_green().bold().to_string()
        );
    }
}
