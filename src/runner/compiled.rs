//! Compiled runners: build with `rustc`, run through the worker supervisor.
//!
//! Builds go to a staging path. The running worker is only torn down after
//! the compiler succeeded, then the staging binary replaces the artifact and
//! a fresh worker starts from it.

use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::{Duration, Instant};

use thiserror::Error;

use super::{DayPaths, ReloadStatus, ResultSlot};
use crate::config::BuildConfig;
use crate::core::TaskSelector;
use crate::utils::exec::Cmd;
use crate::utils::path::display_relative;
use crate::worker::{WorkerState, WorkerSupervisor};
use crate::{debug, log, logger};

/// Errors from one compile attempt.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("entry file not found: {0}")]
    MissingEntry(PathBuf),

    #[error("failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0:#}")]
    Spawn(anyhow::Error),

    #[error("compilation failed ({status})")]
    Compile {
        status: ExitStatus,
        diagnostics: String,
    },
}

impl BuildError {
    /// Compiler output worth showing below the summary line.
    pub fn diagnostics(&self) -> &str {
        match self {
            Self::Compile { diagnostics, .. } => diagnostics,
            _ => "",
        }
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Resolved compiler invocation shared by compiled and script runners.
#[derive(Debug, Clone)]
pub struct Rustc {
    bin: PathBuf,
    edition: String,
    flags: Vec<String>,
}

impl Rustc {
    pub fn from_config(build: &BuildConfig) -> anyhow::Result<Self> {
        Ok(Self {
            bin: build.resolve_rustc()?,
            edition: build.edition.clone(),
            flags: build.flags.clone(),
        })
    }

    /// Compile `entry` into `output`, returning the compile time.
    pub async fn compile(
        &self,
        entry: &Path,
        output: &Path,
        extra: &[String],
    ) -> Result<Duration, BuildError> {
        if !entry.is_file() {
            return Err(BuildError::MissingEntry(entry.to_path_buf()));
        }
        if let Some(dir) = output.parent() {
            std::fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;
        }

        let mut cmd = Cmd::new(&self.bin)
            .args(["--edition", &self.edition, "--crate-name", "solution"])
            .args(extra)
            .args(&self.flags)
            .arg("-o")
            .arg(output)
            .arg(entry);
        if let Some(dir) = entry.parent() {
            cmd = cmd.cwd(dir);
        }
        debug!("build"; "{}", cmd.display());

        let started = Instant::now();
        let result = cmd.output().await.map_err(BuildError::Spawn)?;
        if !result.status.success() {
            let mut diagnostics = String::from_utf8_lossy(&result.stderr).trim().to_string();
            if diagnostics.is_empty() {
                diagnostics = String::from_utf8_lossy(&result.stdout).trim().to_string();
            }
            return Err(BuildError::Compile {
                status: result.status,
                diagnostics,
            });
        }
        Ok(started.elapsed())
    }
}

/// Build profile of a compiled runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Debug build with a persistent incremental cache.
    Incremental,
    /// Optimized, LTO, stripped.
    Release,
}

impl Profile {
    /// Directory (inside the day) holding the artifact.
    const fn out_dir(self) -> &'static str {
        match self {
            Self::Incremental => "target",
            Self::Release => "dist",
        }
    }

    fn flags(self, day_dir: &Path) -> Vec<String> {
        match self {
            Self::Incremental => vec![
                "-C".into(),
                format!("incremental={}", day_dir.join("target/incremental").display()),
            ],
            Self::Release => ["opt-level=3", "lto=fat", "codegen-units=1", "strip=symbols"]
                .into_iter()
                .flat_map(|flag| ["-C".to_string(), flag.to_string()])
                .collect(),
        }
    }
}

/// Incremental and release runners.
pub struct CompiledRunner {
    profile: Profile,
    rustc: Rustc,
    paths: DayPaths,
    artifact: PathBuf,
    staging: PathBuf,
    supervisor: WorkerSupervisor,
}

impl CompiledRunner {
    pub fn new(
        profile: Profile,
        build: &BuildConfig,
        paths: DayPaths,
        results: ResultSlot,
    ) -> anyhow::Result<Self> {
        let out_dir = paths.dir.join(profile.out_dir());
        let artifact = out_dir.join(format!("solution{EXE_SUFFIX}"));
        let staging = out_dir.join(format!(".solution-staging{EXE_SUFFIX}"));
        let supervisor = WorkerSupervisor::new(paths.input.clone(), results);

        Ok(Self {
            profile,
            rustc: Rustc::from_config(build)?,
            paths,
            artifact,
            staging,
            supervisor,
        })
    }

    pub async fn reload(&mut self, task: Option<TaskSelector>) -> ReloadStatus {
        let flags = self.profile.flags(&self.paths.dir);
        let elapsed = match self
            .rustc
            .compile(&self.paths.entry, &self.staging, &flags)
            .await
        {
            Ok(elapsed) => elapsed,
            Err(e) => {
                // The previous worker keeps running against its own artifact
                logger::status_error(&format!("build failed: {e}"), e.diagnostics());
                return ReloadStatus::Failed;
            }
        };

        self.supervisor.delete().await;
        if let Err(e) = std::fs::rename(&self.staging, &self.artifact) {
            logger::status_error(
                "build failed",
                &BuildError::io(&self.artifact, e).to_string(),
            );
            return ReloadStatus::Failed;
        }

        log!(
            "build";
            "{} in {:.2?}",
            display_relative(&self.artifact, &self.paths.dir),
            elapsed
        );
        if let Some(task) = task {
            log!("dev"; "running {}", task);
        }

        self.supervisor.create(&self.artifact, task).await;
        ReloadStatus::Started
    }

    pub async fn dispose(&mut self) {
        self.supervisor.delete().await;
        if self.staging.exists() {
            let _ = std::fs::remove_file(&self.staging);
        }
    }

    pub fn worker_state(&self) -> WorkerState {
        self.supervisor.state()
    }
}
