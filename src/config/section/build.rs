//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! rustc = "rustc"          # Compiler binary (PATH lookup, `~` expanded)
//! edition = "2021"         # Rust edition for solutions
//! flags = ["-W", "unused"] # Extra flags passed to every compile
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::types::ConfigDiagnostics;

const EDITIONS: &[&str] = &["2015", "2018", "2021", "2024"];

/// Compiler settings shared by every builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Compiler binary name or path.
    pub rustc: String,

    /// Rust edition passed as `--edition`.
    pub edition: String,

    /// Extra compiler flags.
    pub flags: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            rustc: "rustc".into(),
            edition: "2021".into(),
            flags: Vec::new(),
        }
    }
}

impl BuildConfig {
    /// Resolve the compiler binary: expand `~`, then look it up on PATH.
    pub fn resolve_rustc(&self) -> anyhow::Result<PathBuf> {
        let expanded = shellexpand::tilde(&self.rustc);
        which::which(expanded.as_ref())
            .map_err(|e| anyhow::anyhow!("compiler `{}` not found: {}", self.rustc, e))
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !EDITIONS.contains(&self.edition.as_str()) {
            diag.error_with_hint(
                "build.edition",
                format!("unknown edition `{}`", self.edition),
                format!("expected one of {}", EDITIONS.join(", ")),
            );
        }
        if self.rustc.trim().is_empty() {
            diag.error("build.rustc", "compiler name is empty");
        }
    }
}
