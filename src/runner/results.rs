//! Parsing of `Part N: <result> (took <ms>ms)` lines from solution output.

use std::fmt;
use std::sync::{Arc, LazyLock};

use owo_colors::OwoColorize;
use parking_lot::Mutex;
use regex::Regex;

use crate::core::{Outcome, Part};

static PART_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Part (\d+): (\d+|\w+) \(took ([\d.]+)ms\)").expect("valid result regex")
});

/// One part's answer and how long it took.
#[derive(Debug, Clone, PartialEq)]
pub struct PartResult {
    pub result: String,
    /// Milliseconds
    pub time: f64,
}

/// Both parts of a solution run.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResults {
    pub part1: PartResult,
    pub part2: PartResult,
}

impl ParsedResults {
    pub const fn part(&self, part: Part) -> &PartResult {
        match part {
            Part::One => &self.part1,
            Part::Two => &self.part2,
        }
    }

    /// Combined running time in milliseconds.
    pub fn total_time(&self) -> f64 {
        self.part1.time + self.part2.time
    }
}

impl fmt::Display for ParsedResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Part 1: {} {}  Part 2: {} {}  Total: {}",
            self.part1.result.bold(),
            format!("({:.3}ms)", self.part1.time).dimmed(),
            self.part2.result.bold(),
            format!("({:.3}ms)", self.part2.time).dimmed(),
            format!("{:.3}ms", self.total_time()).cyan(),
        )
    }
}

/// Latest parsed results of the session, written by runners and read by submit.
pub type ResultSlot = Arc<Mutex<Option<ParsedResults>>>;

/// Extract both parts from `output`. A missing part fails the whole parse.
///
/// When a part is printed more than once, the last line wins.
pub fn parse_results(output: &str) -> Outcome<ParsedResults> {
    let mut part1 = None;
    let mut part2 = None;

    for caps in PART_LINE.captures_iter(output) {
        let Ok(time) = caps[3].parse::<f64>() else {
            continue;
        };
        let parsed = PartResult {
            result: caps[2].to_string(),
            time,
        };
        match &caps[1] {
            "1" => part1 = Some(parsed),
            "2" => part2 = Some(parsed),
            _ => {}
        }
    }

    match (part1, part2) {
        (Some(part1), Some(part2)) => Outcome::ok(ParsedResults { part1, part2 }),
        (None, None) => Outcome::error("No results found in output"),
        (None, Some(_)) => Outcome::error("Missing result for Part 1"),
        (Some(_), None) => Outcome::error("Missing result for Part 2"),
    }
}
