//! Noise filtering for the watcher.
//!
//! Patterns use gitignore syntax and are matched relative to the watched
//! directory. The set is built from the defaults below, the non-empty lines
//! of the project `.gitignore` and `[dev].ignore`.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::log;

/// Hidden entries, build output and dependency directories.
pub const DEFAULT_IGNORES: &[&str] = &[
    ".*",
    "dist/",
    "target/",
    "node_modules/",
    "bower_components/",
    "vendor/",
];

/// Compiled ignore patterns for one watched directory.
pub struct IgnoreSet {
    root: PathBuf,
    matcher: Gitignore,
}

impl IgnoreSet {
    /// Build from defaults plus `extra` patterns. Invalid patterns are logged
    /// and skipped.
    pub fn new<S: AsRef<str>>(root: &Path, extra: &[S]) -> Self {
        let mut builder = GitignoreBuilder::new(root);

        let mut patterns: Vec<&str> = DEFAULT_IGNORES.to_vec();
        patterns.extend(extra.iter().map(|p| p.as_ref()));
        for pattern in patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log!("warning"; "invalid ignore pattern `{}`: {}", pattern, e);
            }
        }

        let matcher = builder.build().unwrap_or_else(|e| {
            log!("warning"; "ignore patterns unusable, using none: {}", e);
            Gitignore::empty()
        });

        Self {
            root: root.to_path_buf(),
            matcher,
        }
    }

    /// Whether a changed path should be dropped.
    ///
    /// Paths outside the watched directory are always ignored.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return true;
        };
        if relative.as_os_str().is_empty() || is_temp_file(path) {
            return true;
        }
        self.matcher
            .matched_path_or_any_parents(relative, path.is_dir())
            .is_ignore()
    }
}

/// Non-empty lines of `.gitignore` at `root`; empty when there is none.
pub fn gitignore_lines(root: &Path) -> Vec<String> {
    std::fs::read_to_string(root.join(".gitignore"))
        .map(|content| {
            content
                .lines()
                .map(str::trim_end)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// A `.gitignore` exists but has no literal `input.txt` / `**/input.txt` line.
pub fn missing_input_rule(lines: &[String]) -> bool {
    !lines.is_empty() && !lines.iter().any(|l| l == "input.txt" || l == "**/input.txt")
}

/// Editor swap and backup files.
fn is_temp_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with('~')
        || name.ends_with(".swp")
        || name.ends_with(".swx")
        || name.ends_with(".tmp")
        || (name.starts_with('#') && name.ends_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(extra: &[&str]) -> IgnoreSet {
        IgnoreSet::new(Path::new("/aoc/2024/1"), extra)
    }

    #[test]
    fn test_defaults() {
        let set = set(&[]);
        let root = Path::new("/aoc/2024/1");

        assert!(!set.is_ignored(&root.join("main.rs")));
        assert!(!set.is_ignored(&root.join("src/lib.rs")));

        assert!(set.is_ignored(&root.join(".hidden")));
        assert!(set.is_ignored(&root.join(".git/index")));
        assert!(set.is_ignored(&root.join("target/solution")));
        assert!(set.is_ignored(&root.join("dist/solution")));
        assert!(set.is_ignored(&root.join("deep/node_modules/pkg/index.js")));
        assert!(set.is_ignored(&root.join("vendor/x.rs")));
    }

    #[test]
    fn test_extra_patterns() {
        let set = set(&["*.log", "scratch/"]);
        let root = Path::new("/aoc/2024/1");

        assert!(set.is_ignored(&root.join("debug.log")));
        assert!(set.is_ignored(&root.join("scratch/notes.rs")));
        assert!(!set.is_ignored(&root.join("main.rs")));
    }

    #[test]
    fn test_outside_root_and_temp_files() {
        let set = set(&[]);
        assert!(set.is_ignored(Path::new("/elsewhere/main.rs")));
        assert!(set.is_ignored(Path::new("/aoc/2024/1/main.rs~")));
        assert!(set.is_ignored(Path::new("/aoc/2024/1/main.rs.swp")));
    }

    #[test]
    fn test_input_gitignore_rule() {
        let lines = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert!(!missing_input_rule(&lines(&[])));
        assert!(!missing_input_rule(&lines(&["target", "**/input.txt"])));
        assert!(!missing_input_rule(&lines(&["input.txt"])));
        // Literal rule: globs that would match are not recognized
        assert!(missing_input_rule(&lines(&["target", "*.txt"])));
        assert!(missing_input_rule(&lines(&["/input.txt"])));
    }

    #[test]
    fn test_gitignore_lines_drop_blanks() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join(".gitignore"), "target\n\n**/input.txt\n").unwrap();

        assert_eq!(gitignore_lines(temp.path()), vec!["target", "**/input.txt"]);
        assert!(gitignore_lines(&temp.path().join("missing")).is_empty());
    }
}
