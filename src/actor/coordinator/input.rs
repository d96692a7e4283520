//! Session preconditions: the puzzle input and its `.gitignore` rule.

use std::fs;

use crate::actor::watch::filter::missing_input_rule;
use crate::aoc::PuzzleClient;
use crate::runner::DayPaths;
use crate::{log, logger};

/// Warn when `.gitignore` would let the puzzle input be committed.
pub(super) fn warn_unignored_input(gitignore: &[String]) {
    if missing_input_rule(gitignore) {
        log!(
            "warning";
            "input.txt is not in your .gitignore file. Add the following: **/input.txt"
        );
    }
}

/// Download the input when the day has none yet. Failures only warn.
pub(super) async fn ensure_input(client: &dyn PuzzleClient, paths: &DayPaths) {
    if paths.input.exists() {
        return;
    }

    log!("dev"; "no puzzle input found, fetching it");
    let input = match client.get_input(paths.year, paths.day).await.into_result() {
        Ok(input) => input,
        Err(e) => {
            logger::status_warning(&format!("could not fetch puzzle input: {e}"));
            return;
        }
    };
    match fs::write(&paths.input, input) {
        Ok(()) => log!("dev"; "saved puzzle input to {}", paths.input.display()),
        Err(e) => logger::status_warning(&format!(
            "could not write {}: {}",
            paths.input.display(),
            e
        )),
    }
}
