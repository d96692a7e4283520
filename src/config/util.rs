//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/aoc/2024/3/        ← start
/// /home/user/aoc/aockit.toml    ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None, // Reached filesystem root
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_file_walks_upward() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("2024").join("3");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join("aockit.toml"), "").unwrap();

        let found = find_config_file(Path::new("aockit.toml"), &nested).unwrap();
        assert_eq!(found, temp.path().join("aockit.toml"));
    }

    #[test]
    fn test_find_config_file_missing() {
        let temp = TempDir::new().unwrap();
        assert!(find_config_file(Path::new("aockit-missing-config.toml"), temp.path()).is_none());
    }

    #[test]
    fn test_find_config_file_absolute() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        assert!(find_config_file(&path, temp.path()).is_none());

        std::fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path, Path::new("/")), Some(path));
    }
}
