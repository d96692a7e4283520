use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::mpsc;

use super::Coordinator;
use crate::aoc::PuzzleClient;
use crate::actor::messages::ControlMsg;
use crate::config::test_parse_config;
use crate::core::{Outcome, Part};

struct FixedInput(&'static str);

#[async_trait]
impl PuzzleClient for FixedInput {
    async fn get_input(&self, _year: u16, _day: u8) -> Outcome<String> {
        Outcome::ok(self.0.to_string())
    }

    async fn submit(&self, _year: u16, _day: u8, _part: Part, _solution: &str) -> Outcome<bool> {
        Outcome::error("not expected")
    }
}

fn coordinator(temp: &TempDir, day: u8) -> Coordinator {
    let mut config = test_parse_config("[dev]\ndebounce_ms = 20\n");
    config.set_root(temp.path());
    Coordinator::new(config, 2024, day)
        .with_client(Arc::new(FixedInput("1 2 3\n")))
        .interactive(false)
}

#[tokio::test]
async fn test_missing_day_directory() {
    let temp = TempDir::new().unwrap();
    let err = coordinator(&temp, 4).run().await.unwrap_err();
    assert!(err.to_string().contains("does not exist"), "{err}");
}

/// Day 7 of 2024 with an exec runner that copies its input next to the year.
fn exec_day(temp: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let year_dir = temp.path().join("2024");
    let day_dir = year_dir.join("7");
    std::fs::create_dir_all(&day_dir).unwrap();
    std::fs::write(
        year_dir.join(".aockit.json"),
        r#"{ "year": 2024, "days": { "7": { "runner": "sh run.sh" } } }"#,
    )
    .unwrap();
    // Written outside the watched directory so the run does not retrigger itself.
    std::fs::write(day_dir.join("run.sh"), "cat input.txt > ../seen.txt\n").unwrap();
    (year_dir, day_dir)
}

#[tokio::test]
async fn test_session_fetches_input_runs_and_shuts_down() {
    let temp = TempDir::new().unwrap();
    let (year_dir, day_dir) = exec_day(&temp);

    let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
    let session = coordinator(&temp, 7).with_shutdown_signal(shutdown_rx);
    let handle = tokio::spawn(session.run());

    let seen = year_dir.join("seen.txt");
    for _ in 0..300 {
        if std::fs::read_to_string(&seen).is_ok_and(|s| !s.is_empty()) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(std::fs::read_to_string(day_dir.join("input.txt")).unwrap(), "1 2 3\n");
    assert_eq!(std::fs::read_to_string(&seen).unwrap(), "1 2 3\n");

    shutdown_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("session did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_watcher_failure_ends_session_with_error() {
    let temp = TempDir::new().unwrap();
    exec_day(&temp);

    let session = coordinator(&temp, 7).prepare().await.unwrap();
    session
        .context
        .control_tx
        .send(ControlMsg::WatchFailed("watch descriptor lost".into()))
        .unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), session.run())
        .await
        .expect("session did not stop")
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("file watcher failed"), "{message}");
    assert!(message.contains("watch descriptor lost"), "{message}");
}
