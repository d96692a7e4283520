//! Small value types shared by runners, tasks and the puzzle client.

use std::fmt;

/// Task selector appended to the solution's launch arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskSelector {
    Test,
    Bench,
}

impl TaskSelector {
    /// Launch flag passed to the execution unit (`--test` / `--bench`).
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Test => "--test",
            Self::Bench => "--bench",
        }
    }
}

impl fmt::Display for TaskSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Test => "test",
            Self::Bench => "bench",
        })
    }
}

/// Puzzle part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    One,
    Two,
}

impl Part {
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_flags() {
        assert_eq!(TaskSelector::Test.flag(), "--test");
        assert_eq!(TaskSelector::Bench.flag(), "--bench");
        assert_eq!(TaskSelector::Bench.to_string(), "bench");
    }

    #[test]
    fn test_part_display() {
        assert_eq!(Part::One.number(), 1);
        assert_eq!(Part::Two.to_string(), "2");
    }
}
