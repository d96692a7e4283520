//! Project configuration management for `aockit.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   ├── client     # [client]
//! │   └── dev        # [dev]
//! ├── types/         # ConfigError, ConfigDiagnostics
//! └── mod.rs         # KitConfig (this file)
//! ```
//!
//! The config file is optional. When it is missing, defaults apply and the
//! current directory is the project root.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{BuildConfig, Builder, ClientConfig, DevConfig};
pub use types::{ConfigDiagnostics, ConfigError};

use crate::cli::{Cli, Commands};
use crate::log;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing aockit.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KitConfig {
    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// CLI builder override (internal use only)
    #[serde(skip)]
    pub builder_override: Option<Builder>,

    /// Dev loop settings
    #[serde(default)]
    pub dev: DevConfig,

    /// Compiler settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Puzzle platform client settings
    #[serde(default)]
    pub client: ClientConfig,
}

impl KitConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when no config file exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                crate::debug!("config"; "loading {}", path.display());
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config
            }
            None => {
                crate::debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        config.apply_command_options(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} (ignored):", display_path);
        for field in fields {
            log!("warning"; "- {}", field);
        }
    }

    /// Validate all sections, collecting every problem before failing.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.dev.validate(&mut diag);
        self.build.validate(&mut diag);
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        if let Commands::Start { builder, .. } = &cli.command {
            self.builder_override = *builder;
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// `<root>/<year>`
    pub fn year_dir(&self, year: u16) -> PathBuf {
        self.root.join(year.to_string())
    }

    /// `<root>/<year>/<day>`
    pub fn day_dir(&self, year: u16, day: u8) -> PathBuf {
        self.year_dir(year).join(day.to_string())
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
pub fn test_parse_config(extra: &str) -> KitConfig {
    let (parsed, ignored) = KitConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
