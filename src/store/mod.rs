//! Persisted per-year state in `<root>/<year>/.aockit.json`.
//!
//! ```json
//! {
//!   "year": 2024,
//!   "days": {
//!     "1": {
//!       "runner": null,
//!       "part1": { "solved": true, "result": "42", "time": 1.234 },
//!       "part2": { "solved": false, "result": null, "time": null }
//!     }
//!   },
//!   "builder": "incremental"
//! }
//! ```

pub mod readme;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::Builder;
use crate::core::Part;

pub const DATA_FILE: &str = ".aockit.json";

/// State of one puzzle part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartData {
    pub solved: bool,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Milliseconds of the run the answer came from.
    #[serde(default)]
    pub time: Option<f64>,
}

/// State of one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayData {
    /// External command replacing the builder for this day.
    #[serde(default)]
    pub runner: Option<String>,
    #[serde(default)]
    pub part1: PartData,
    #[serde(default)]
    pub part2: PartData,
}

impl DayData {
    pub const fn part(&self, part: Part) -> &PartData {
        match part {
            Part::One => &self.part1,
            Part::Two => &self.part2,
        }
    }

    pub const fn part_mut(&mut self, part: Part) -> &mut PartData {
        match part {
            Part::One => &mut self.part1,
            Part::Two => &mut self.part2,
        }
    }
}

/// Whole-year state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
    pub year: u16,
    #[serde(default)]
    pub days: BTreeMap<u8, DayData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder: Option<Builder>,
}

impl Data {
    /// Fresh state: 25 unsolved days.
    pub fn new(year: u16) -> Self {
        Self {
            year,
            days: (1..=25).map(|day| (day, DayData::default())).collect(),
            builder: None,
        }
    }

    /// Record an accepted answer.
    pub fn record_solved(&mut self, day: u8, part: Part, solution: &str, time: Option<f64>) {
        let data = self.days.entry(day).or_default().part_mut(part);
        data.solved = true;
        data.result = Some(serde_json::Value::String(solution.to_string()));
        data.time = time;
    }
}

/// Reads and writes a year's data file under the project root.
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn path(&self, year: u16) -> PathBuf {
        self.root.join(year.to_string()).join(DATA_FILE)
    }

    /// Load a year's data. A missing file yields fresh data.
    pub fn load(&self, year: u16) -> Result<Data> {
        let path = self.path(year);
        if !path.exists() {
            crate::debug!("store"; "{} not found, using defaults", path.display());
            return Ok(Data::new(year));
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, year: u16, data: &Data) -> Result<()> {
        let path = self.path(year);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
    }
}
