//! `aockit readme` - regenerate a year's README from its stored results.

use anyhow::Result;

use crate::config::KitConfig;
use crate::store::{DataStore, readme};

pub fn update_readme(config: &KitConfig, year: u16) -> Result<()> {
    let data = DataStore::new(config.get_root()).load(year)?;
    readme::update(&config.year_dir(year), &data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::test_parse_config;
    use crate::core::Part;

    #[test]
    fn test_update_readme_from_store() {
        let temp = TempDir::new().unwrap();
        let mut config = test_parse_config("");
        config.set_root(temp.path());

        let store = DataStore::new(temp.path());
        let mut data = store.load(2023).unwrap();
        data.record_solved(1, Part::One, "142", Some(0.25));
        store.save(2023, &data).unwrap();

        let readme_path = readme::readme_path(&config.year_dir(2023));
        std::fs::write(&readme_path, "# 2023\n<!--RESULTS-->\n\n<!--/RESULTS-->\n").unwrap();

        update_readme(&config, 2023).unwrap();
        let contents = std::fs::read_to_string(&readme_path).unwrap();
        assert!(contents.starts_with("# 2023\n<!--RESULTS-->"));
        assert!(contents.contains("Total stars: 1/50"));
    }

    #[test]
    fn test_missing_readme_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let mut config = test_parse_config("");
        config.set_root(temp.path());
        assert!(update_readme(&config, 2023).is_ok());
    }
}
