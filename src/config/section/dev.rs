//! `[dev]` section configuration.
//!
//! Contains dev-loop settings.
//!
//! # Example
//!
//! ```toml
//! [dev]
//! builder = "incremental"   # incremental | release | script
//! debounce_ms = 100         # Quiet window before a rebuild starts
//! entry = "main.rs"         # Solution entry file inside the day directory
//! input = "input.txt"       # Puzzle input file inside the day directory
//! ignore = ["*.log"]        # Extra gitignore-style patterns for the watcher
//! ```

use serde::{Deserialize, Serialize};

use crate::config::types::ConfigDiagnostics;

/// How a solution is turned into something runnable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Builder {
    /// Fast incremental debug build kept in `target/`
    #[default]
    Incremental,
    /// Optimized, stripped build written to `dist/`
    Release,
    /// Compile and evaluate in place on every reload
    Script,
}

/// Dev-loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevConfig {
    /// Default builder when neither the CLI nor `.aockit.json` picks one.
    pub builder: Builder,

    /// Debounce quiet window in milliseconds.
    pub debounce_ms: u64,

    /// Entry file of a day's solution.
    pub entry: String,

    /// Puzzle input file name.
    pub input: String,

    /// Extra ignore patterns (gitignore syntax) for the watcher.
    pub ignore: Vec<String>,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            builder: Builder::Incremental,
            debounce_ms: 100,
            entry: "main.rs".into(),
            input: "input.txt".into(),
            ignore: Vec::new(),
        }
    }
}

impl DevConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.debounce_ms == 0 {
            diag.error_with_hint(
                "dev.debounce_ms",
                "must be greater than 0",
                "100 is a good default",
            );
        }
        if self.entry.trim().is_empty() {
            diag.error("dev.entry", "entry file name is empty");
        }
        if self.input.trim().is_empty() {
            diag.error("dev.input", "input file name is empty");
        }
    }
}
