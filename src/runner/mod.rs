//! Runner backends - turn a day's source into a running solution.
//!
//! # Variants
//!
//! | Kind          | Build                                  | Execution          |
//! |---------------|----------------------------------------|--------------------|
//! | `Incremental` | `rustc -C incremental`, `target/`      | worker supervisor  |
//! | `Release`     | optimized + stripped, `dist/`          | worker supervisor  |
//! | `Script`      | fresh private cache on every reload    | inline, to the end |
//! | `Exec`        | none                                   | configured command |
//!
//! Every reload reports failures itself and never returns an error: a broken
//! build must not end the session.

pub mod compiled;
pub mod exec;
pub mod results;
pub mod script;

use std::path::PathBuf;

use anyhow::Result;

use crate::config::{Builder, KitConfig};
use crate::core::TaskSelector;
use crate::store::Data;
use crate::worker::WorkerState;

pub use compiled::{BuildError, CompiledRunner, Profile};
pub use exec::ExecRunner;
pub use results::{ParsedResults, PartResult, ResultSlot, parse_results};
pub use script::ScriptRunner;

/// Closed set of runner kinds; selection is one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerKind {
    Incremental,
    Release,
    Script,
    Exec(String),
}

impl RunnerKind {
    /// Pick the runner for `day`.
    ///
    /// A per-day `runner` command always wins. Otherwise the CLI builder,
    /// then the year's stored builder, then `[dev].builder`.
    pub fn resolve(config: &KitConfig, data: &Data, day: u8) -> Self {
        if let Some(command) = data.days.get(&day).and_then(|d| d.runner.as_deref()) {
            return Self::Exec(command.to_string());
        }

        let builder = config
            .builder_override
            .or(data.builder)
            .unwrap_or(config.dev.builder);
        match builder {
            Builder::Incremental => Self::Incremental,
            Builder::Release => Self::Release,
            Builder::Script => Self::Script,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Incremental => "incremental",
            Self::Release => "release",
            Self::Script => "script",
            Self::Exec(command) => command,
        }
    }
}

/// Absolute paths of one puzzle day.
#[derive(Debug, Clone)]
pub struct DayPaths {
    pub year: u16,
    pub day: u8,
    pub dir: PathBuf,
    pub entry: PathBuf,
    pub input: PathBuf,
}

impl DayPaths {
    pub fn new(config: &KitConfig, year: u16, day: u8) -> Self {
        let dir = config.day_dir(year, day);
        Self {
            year,
            day,
            entry: dir.join(&config.dev.entry),
            input: dir.join(&config.dev.input),
            dir,
        }
    }
}

/// What a reload ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadStatus {
    /// Build succeeded and a worker was started.
    Started,
    /// The solution ran to completion inline.
    Completed,
    /// Build or run failed; already reported.
    Failed,
}

/// The session's single runner.
pub enum Runner {
    Compiled(CompiledRunner),
    Script(ScriptRunner),
    Exec(ExecRunner),
}

impl Runner {
    pub fn new(
        kind: &RunnerKind,
        config: &KitConfig,
        paths: DayPaths,
        results: ResultSlot,
    ) -> Result<Self> {
        Ok(match kind {
            RunnerKind::Incremental => Self::Compiled(CompiledRunner::new(
                Profile::Incremental,
                &config.build,
                paths,
                results,
            )?),
            RunnerKind::Release => Self::Compiled(CompiledRunner::new(
                Profile::Release,
                &config.build,
                paths,
                results,
            )?),
            RunnerKind::Script => Self::Script(ScriptRunner::new(&config.build, paths, results)?),
            RunnerKind::Exec(command) => Self::Exec(ExecRunner::new(command, paths, results)?),
        })
    }

    /// Rebuild and rerun. `task` is ignored by the exec variant.
    pub async fn reload(&mut self, task: Option<TaskSelector>) -> ReloadStatus {
        match self {
            Self::Compiled(runner) => runner.reload(task).await,
            Self::Script(runner) => runner.reload(task).await,
            Self::Exec(runner) => runner.reload(task).await,
        }
    }

    /// Release the worker and cached state. Safe to call repeatedly.
    pub async fn dispose(&mut self) {
        match self {
            Self::Compiled(runner) => runner.dispose().await,
            Self::Script(runner) => runner.dispose(),
            Self::Exec(_) => {}
        }
    }

    /// The variant cannot honor task selectors.
    pub const fn exec(&self) -> bool {
        matches!(self, Self::Exec(_))
    }

    /// State of the supervised worker; `Idle` for variants without one.
    pub fn worker_state(&self) -> WorkerState {
        match self {
            Self::Compiled(runner) => runner.worker_state(),
            Self::Script(_) | Self::Exec(_) => WorkerState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use crate::store::DayData;

    #[test]
    fn test_resolve_defaults_to_config_builder() {
        let config = test_parse_config("[dev]\nbuilder = \"release\"");
        let data = Data::new(2024);
        assert_eq!(RunnerKind::resolve(&config, &data, 1), RunnerKind::Release);
    }

    #[test]
    fn test_resolve_precedence() {
        let mut config = test_parse_config("[dev]\nbuilder = \"release\"");
        let mut data = Data::new(2024);
        data.builder = Some(Builder::Script);
        assert_eq!(RunnerKind::resolve(&config, &data, 1), RunnerKind::Script);

        config.builder_override = Some(Builder::Incremental);
        assert_eq!(RunnerKind::resolve(&config, &data, 1), RunnerKind::Incremental);
    }

    #[test]
    fn test_resolve_day_runner_forces_exec() {
        let mut config = test_parse_config("");
        config.builder_override = Some(Builder::Release);
        let mut data = Data::new(2024);
        data.days.insert(
            5,
            DayData {
                runner: Some("python3 main.py".into()),
                ..DayData::default()
            },
        );

        assert_eq!(
            RunnerKind::resolve(&config, &data, 5),
            RunnerKind::Exec("python3 main.py".into())
        );
        assert_eq!(RunnerKind::resolve(&config, &data, 6), RunnerKind::Release);
    }

    #[tokio::test]
    async fn test_exec_runner_flag_and_dispose() {
        let config = test_parse_config("");
        let paths = DayPaths::new(&config, 2024, 1);
        let results: ResultSlot = std::sync::Arc::new(parking_lot::Mutex::new(None));

        let mut runner =
            Runner::new(&RunnerKind::Exec("sh run.sh".into()), &config, paths, results).unwrap();
        assert!(runner.exec());

        runner.dispose().await;
        runner.dispose().await;
        assert_eq!(runner.worker_state(), WorkerState::Idle);
    }

    #[test]
    fn test_day_paths() {
        let mut config = test_parse_config("[dev]\nentry = \"solution.rs\"");
        config.set_root(std::path::Path::new("/aoc"));
        let paths = DayPaths::new(&config, 2023, 7);
        assert_eq!(paths.dir, PathBuf::from("/aoc/2023/7"));
        assert_eq!(paths.entry, PathBuf::from("/aoc/2023/7/solution.rs"));
        assert_eq!(paths.input, PathBuf::from("/aoc/2023/7/input.txt"));
    }
}
