//! Day badges and result tables inside a year's `README.md`.
//!
//! Only the text between the marker pairs is replaced:
//!
//! ```text
//! <!--SOLUTIONS--> ... <!--/SOLUTIONS-->
//! <!--RESULTS--> ... <!--/RESULTS-->
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use super::{Data, DayData};
use crate::core::Part;
use crate::log;

static SOLUTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--SOLUTIONS-->.+<!--/SOLUTIONS-->").expect("valid regex"));
static RESULTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--RESULTS-->.+<!--/RESULTS-->").expect("valid regex"));

/// Round to 3 decimals and drop trailing zeros (`1.500` → `1.5`).
fn fixed(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    format!("{rounded}")
}

/// Day 25 has a single puzzle; its second star comes with the first.
fn stars(day: u8, data: &DayData) -> (bool, bool) {
    let first = data.part(Part::One).solved;
    let second = data.part(Part::Two).solved || (day == 25 && first);
    (first, second)
}

/// One badge per day, linked to the day directory once a part is solved.
pub fn day_badges(data: &Data) -> String {
    let mut lines = Vec::with_capacity(data.days.len());
    for (&day, entry) in &data.days {
        let (first, second) = stars(day, entry);
        let color = match (first, second) {
            (true, true) => "green",
            (false, false) => "gray",
            _ => "yellow",
        };
        let star = |solved: bool| if solved { "%E2%98%85" } else { "%E2%98%86" };
        let badge = format!(
            "![Day](https://badgen.net/badge/{day:02}/{}{}/{color})",
            star(first),
            star(second)
        );
        if color == "gray" {
            lines.push(badge);
        } else {
            lines.push(format!("[{badge}]({day})"));
        }
    }
    lines.join("\n")
}

/// Per-day timing blocks followed by star and time totals.
pub fn results(data: &Data) -> String {
    let mut total_time = 0.0;
    let mut total_stars = 0;
    let mut blocks = Vec::with_capacity(data.days.len() + 1);

    for (&day, entry) in &data.days {
        let mut both = 0.0;
        for part in [&entry.part1, &entry.part2] {
            if part.solved {
                total_stars += 1;
                total_time += part.time.unwrap_or(0.0);
                both += part.time.unwrap_or(0.0);
            }
        }
        if day == 25 && entry.part1.solved {
            total_stars += 1;
        }

        let time = |part: &super::PartData| match part.time {
            Some(t) if part.solved => format!("{}ms", fixed(t)),
            _ => "-".to_string(),
        };
        blocks.push(format!(
            "```\nDay {day:02}\nTime part 1: {}\nTime part 2: {}\nBoth parts: {}\n```",
            time(&entry.part1),
            time(&entry.part2),
            if both == 0.0 {
                "-".to_string()
            } else {
                format!("{}ms", fixed(both))
            }
        ));
    }

    blocks.push(format!(
        "```\nTotal stars: {total_stars}/50\nTotal time: {}ms\n```",
        fixed(total_time)
    ));
    blocks.join("\n\n")
}

/// Replace both generated blocks in `contents`.
pub fn render(contents: &str, data: &Data) -> String {
    let badges = format!("<!--SOLUTIONS-->\n\n{}\n\n<!--/SOLUTIONS-->", day_badges(data));
    let results = format!("<!--RESULTS-->\n\n{}\n\n<!--/RESULTS-->", results(data));

    let contents = SOLUTIONS.replace(contents, regex::NoExpand(&badges));
    RESULTS
        .replace(&contents, regex::NoExpand(&results))
        .into_owned()
}

/// `<year dir>/README.md`
pub fn readme_path(year_dir: &Path) -> PathBuf {
    year_dir.join("README.md")
}

/// Regenerate the README of a year. A missing README is only logged.
pub fn update(year_dir: &Path, data: &Data) -> Result<bool> {
    let path = readme_path(year_dir);
    if !path.is_file() {
        log!("readme"; "{} not found, skipping", path.display());
        return Ok(false);
    }

    let contents =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    fs::write(&path, render(&contents, data))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log!("readme"; "updated README for year {}", data.year);
    Ok(true)
}
