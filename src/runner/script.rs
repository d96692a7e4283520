//! Script runner: compile into a throwaway cache and run to completion.
//!
//! No artifact outlives a reload. Each reload drops the previous cache
//! directory, compiles into a new one, runs the program inline and parses
//! what it printed.

use std::env::consts::EXE_SUFFIX;
use std::time::Instant;

use tempfile::TempDir;

use super::compiled::{BuildError, Rustc};
use super::{DayPaths, ReloadStatus, ResultSlot, parse_results};
use crate::config::BuildConfig;
use crate::core::{Outcome, TaskSelector};
use crate::utils::exec::Cmd;
use crate::{debug, log, logger};

pub struct ScriptRunner {
    rustc: Rustc,
    paths: DayPaths,
    results: ResultSlot,
    cache: Option<TempDir>,
}

impl ScriptRunner {
    pub fn new(build: &BuildConfig, paths: DayPaths, results: ResultSlot) -> anyhow::Result<Self> {
        Ok(Self {
            rustc: Rustc::from_config(build)?,
            paths,
            results,
            cache: None,
        })
    }

    pub async fn reload(&mut self, task: Option<TaskSelector>) -> ReloadStatus {
        // Clear before evaluating, so nothing stale can be picked up
        self.dispose();
        *self.results.lock() = None;

        let cache = match tempfile::Builder::new().prefix("aockit-script-").tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                logger::status_error("failed to create script cache", &e.to_string());
                return ReloadStatus::Failed;
            }
        };
        let binary = cache.path().join(format!("solution{EXE_SUFFIX}"));
        debug!("script"; "cache: {}", cache.path().display());
        self.cache = Some(cache);

        if let Err(e) = self.rustc.compile(&self.paths.entry, &binary, &[]).await {
            logger::status_error(&format!("build failed: {e}"), e.diagnostics());
            return ReloadStatus::Failed;
        }

        let mut cmd = Cmd::new(&binary)
            .arg(format!("--input={}", self.paths.input.display()))
            .cwd(&self.paths.dir);
        if let Some(task) = task {
            log!("dev"; "running {}", task);
            cmd = cmd.arg(task.flag());
        }

        let started = Instant::now();
        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) => {
                let e = BuildError::Spawn(e);
                logger::status_error("failed to run solution", &e.to_string());
                return ReloadStatus::Failed;
            }
        };
        let elapsed = started.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            logger::raw(stdout.trim_end());
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            log!("script:stderr"; "{}", line);
        }

        if !output.status.success() {
            logger::status_error("solution crashed", &output.status.to_string());
            return ReloadStatus::Failed;
        }

        match parse_results(&stdout) {
            Outcome::Ok { value } => {
                logger::status_success(&value.to_string());
                // Test and bench timings are not solve times
                if task.is_none() {
                    *self.results.lock() = Some(value);
                }
            }
            Outcome::Err { .. } => {
                logger::status_success(&format!(
                    "solution finished in {:.3}ms",
                    elapsed.as_secs_f64() * 1000.0
                ));
            }
        }
        ReloadStatus::Completed
    }

    /// Drop the cache directory. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if let Some(cache) = self.cache.take() {
            let path = cache.path().to_path_buf();
            if let Err(e) = cache.close() {
                debug!("script"; "failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tempfile::TempDir;

    use super::*;
    use crate::config::test_parse_config;

    /// Writes a program that prints both parts and `$2` as part 2's answer.
    const FAKE_RUSTC: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift; fi
  shift
done
cat > "$out" <<'PROGRAM'
#!/bin/sh
echo "Part 1: 10 (took 2ms)"
echo "Part 2: x${2#--} (took 3ms)"
PROGRAM
chmod +x "$out"
"#;

    fn make_runner() -> (TempDir, ScriptRunner, ResultSlot) {
        let temp = TempDir::new().unwrap();
        let rustc = temp.path().join("fake-rustc");
        std::fs::write(&rustc, FAKE_RUSTC).unwrap();
        std::fs::set_permissions(&rustc, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = test_parse_config("");
        config.set_root(temp.path());
        config.build.rustc = rustc.display().to_string();

        let paths = DayPaths::new(&config, 2024, 2);
        std::fs::create_dir_all(&paths.dir).unwrap();
        std::fs::write(&paths.entry, "fn main() {}\n").unwrap();

        let results: ResultSlot = Arc::new(Mutex::new(None));
        let runner = ScriptRunner::new(&config.build, paths, Arc::clone(&results)).unwrap();
        (temp, runner, results)
    }

    #[tokio::test]
    async fn test_reload_runs_to_completion() {
        let (_temp, mut runner, results) = make_runner();

        assert_eq!(runner.reload(None).await, ReloadStatus::Completed);

        let parsed = results.lock().clone().unwrap();
        assert_eq!(parsed.part1.result, "10");
        assert_eq!(parsed.part2.result, "x");
    }

    #[tokio::test]
    async fn test_selector_run_leaves_no_results() {
        let (_temp, mut runner, results) = make_runner();
        runner.reload(None).await;
        assert!(results.lock().is_some());

        assert_eq!(runner.reload(Some(TaskSelector::Bench)).await, ReloadStatus::Completed);
        assert!(results.lock().is_none());
    }

    #[tokio::test]
    async fn test_each_reload_uses_fresh_cache() {
        let (_temp, mut runner, _) = make_runner();

        runner.reload(None).await;
        let first = runner.cache.as_ref().unwrap().path().to_path_buf();
        runner.reload(None).await;
        let second = runner.cache.as_ref().unwrap().path().to_path_buf();

        assert_ne!(first, second);
        assert!(!first.exists());
    }

    #[tokio::test]
    async fn test_dispose_clears_cache() {
        let (_temp, mut runner, _) = make_runner();
        runner.reload(None).await;
        let cache = runner.cache.as_ref().unwrap().path().to_path_buf();

        runner.dispose();
        runner.dispose();
        assert!(!cache.exists());
        assert!(runner.cache.is_none());
    }
}
