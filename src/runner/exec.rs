//! External-command runner: run a configured command in the day directory.
//!
//! The command comes from the day's `runner` entry in `.aockit.json`, e.g.
//! `"python3 main.py"`. Task selectors are not forwarded.

use anyhow::{Result, bail};

use super::{DayPaths, ReloadStatus, ResultSlot, parse_results};
use crate::core::{Outcome, TaskSelector};
use crate::utils::exec::Cmd;
use crate::{debug, log, logger};

pub struct ExecRunner {
    command: String,
    argv: Vec<String>,
    paths: DayPaths,
    results: ResultSlot,
}

impl ExecRunner {
    pub fn new(command: &str, paths: DayPaths, results: ResultSlot) -> Result<Self> {
        let argv = match shlex::split(command) {
            Some(argv) if !argv.is_empty() => argv,
            _ => bail!("invalid runner command for day {}: `{}`", paths.day, command),
        };
        Ok(Self {
            command: command.to_string(),
            argv,
            paths,
            results,
        })
    }

    pub async fn reload(&mut self, task: Option<TaskSelector>) -> ReloadStatus {
        if let Some(task) = task {
            debug!("exec"; "ignoring {} selector", task);
        }
        log!("exec"; "{}", self.command);
        *self.results.lock() = None;

        let output = match Cmd::from_slice(&self.argv).cwd(&self.paths.dir).output().await {
            Ok(output) => output,
            Err(e) => {
                logger::status_error(&format!("failed to run `{}`", self.command), &format!("{e:#}"));
                return ReloadStatus::Failed;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| output.status.to_string(), |c| format!("exit code {c}"));
            let stderr = String::from_utf8_lossy(&output.stderr);
            logger::status_error(&format!("`{}` failed with {code}", self.command), stderr.trim());
            return ReloadStatus::Failed;
        }

        match parse_results(&stdout) {
            Outcome::Ok { value } => {
                logger::status_success(&value.to_string());
                *self.results.lock() = Some(value);
            }
            Outcome::Err { .. } => {
                let text = stdout.trim();
                logger::raw(if text.is_empty() { "[No output]" } else { text });
            }
        }
        log!("exec"; "run completed with exit code {}", output.status.code().unwrap_or(0));
        ReloadStatus::Completed
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tempfile::TempDir;

    use super::*;
    use crate::config::test_parse_config;

    fn make_runner(command: &str, script: &str) -> (TempDir, ExecRunner, ResultSlot) {
        let temp = TempDir::new().unwrap();
        let mut config = test_parse_config("");
        config.set_root(temp.path());

        let paths = DayPaths::new(&config, 2024, 3);
        std::fs::create_dir_all(&paths.dir).unwrap();
        std::fs::write(paths.dir.join("run.sh"), script).unwrap();

        let results: ResultSlot = Arc::new(Mutex::new(None));
        let runner = ExecRunner::new(command, paths, Arc::clone(&results)).unwrap();
        (temp, runner, results)
    }

    #[test]
    fn test_invalid_command() {
        let temp = TempDir::new().unwrap();
        let mut config = test_parse_config("");
        config.set_root(temp.path());
        let paths = DayPaths::new(&config, 2024, 3);
        let results: ResultSlot = Arc::new(Mutex::new(None));

        assert!(ExecRunner::new("", paths.clone(), Arc::clone(&results)).is_err());
        assert!(ExecRunner::new("sh 'unterminated", paths, results).is_err());
    }

    #[tokio::test]
    async fn test_parses_results_from_stdout() {
        let (_temp, mut runner, results) = make_runner(
            "sh run.sh",
            "echo 'Part 1: 42 (took 1.234ms)'\necho 'Part 2: 99 (took 0.500ms)'\n",
        );

        assert_eq!(runner.reload(None).await, ReloadStatus::Completed);
        let parsed = results.lock().clone().unwrap();
        assert_eq!(parsed.part1.time, 1.234);
        assert_eq!(parsed.part2.result, "99");
    }

    #[tokio::test]
    async fn test_task_selector_is_not_forwarded() {
        // Reports its argument count as part 1
        let (_temp, mut runner, results) = make_runner(
            "sh run.sh",
            "echo \"Part 1: $# (took 1ms)\"\necho 'Part 2: 0 (took 1ms)'\n",
        );

        runner.reload(Some(TaskSelector::Test)).await;
        let parsed = results.lock().clone().unwrap();
        assert_eq!(parsed.part1.result, "0");
    }

    #[tokio::test]
    async fn test_nonzero_exit_fails() {
        let (_temp, mut runner, results) =
            make_runner("sh run.sh", "echo 'Part 1: 1 (took 1ms)'\nexit 2\n");

        assert_eq!(runner.reload(None).await, ReloadStatus::Failed);
        assert!(results.lock().is_none());
    }

    #[tokio::test]
    async fn test_unparsable_output_still_completes() {
        let (_temp, mut runner, results) = make_runner("sh run.sh", "echo hello\n");

        assert_eq!(runner.reload(None).await, ReloadStatus::Completed);
        assert!(results.lock().is_none());
    }

    #[tokio::test]
    async fn test_results_do_not_outlive_their_run() {
        let (_temp, mut runner, results) = make_runner(
            "sh run.sh",
            "echo 'Part 1: 1 (took 1ms)'\necho 'Part 2: 2 (took 1ms)'\n",
        );
        runner.reload(None).await;
        assert!(results.lock().is_some());

        std::fs::write(runner.paths.dir.join("run.sh"), "echo hello\n").unwrap();
        assert_eq!(runner.reload(None).await, ReloadStatus::Completed);
        assert!(results.lock().is_none());
    }

    #[tokio::test]
    async fn test_missing_program_fails() {
        let (_temp, mut runner, _) = make_runner("aockit-no-such-program --flag", "");
        assert_eq!(runner.reload(None).await, ReloadStatus::Failed);
    }
}
