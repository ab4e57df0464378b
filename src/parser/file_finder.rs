//! # File Finder
//!
//! Locates the configuration document inside an extracted bundle directory.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File name fragments that mark the preferred document of a bundle
const PREFERRED_NAME_HINTS: [&str; 4] = ["config", "definition", "template", "schema"];

fn is_yaml(file_name: &str) -> bool {
    file_name.ends_with(".yaml") || file_name.ends_with(".yml")
}

/// Find the configuration document under `dir`
///
/// Walks the directory in file-name order. The first YAML file whose
/// lower-cased name contains a preferred hint wins; otherwise the first YAML
/// file seen is used. Returns `None` when the bundle has no YAML file.
#[must_use]
pub fn find_config_document(dir: &Path) -> Option<PathBuf> {
    if !dir.exists() {
        warn!("Bundle directory does not exist: {}", dir.display());
        return None;
    }

    let mut first_yaml: Option<PathBuf> = None;

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
    {
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if !is_yaml(&name) {
            continue;
        }

        if PREFERRED_NAME_HINTS.iter().any(|hint| name.contains(hint)) {
            debug!("Selected configuration document: {}", entry.path().display());
            return Some(entry.into_path());
        }

        if first_yaml.is_none() {
            first_yaml = Some(entry.into_path());
        }
    }

    if let Some(path) = &first_yaml {
        debug!("No preferred document name, using first YAML file: {}", path.display());
    }
    first_yaml
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_prefers_hinted_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.yaml"), "x: 1").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("VNF-Config.yml"), "x: 1").unwrap();

        let found = find_config_document(dir.path()).unwrap();
        assert!(found.ends_with("nested/VNF-Config.yml"));
    }

    #[test]
    fn test_falls_back_to_first_yaml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("readme.txt"), "hi").unwrap();
        fs::write(dir.path().join("b.yml"), "x: 1").unwrap();
        fs::write(dir.path().join("c.yaml"), "x: 1").unwrap();

        let found = find_config_document(dir.path()).unwrap();
        assert!(found.ends_with("b.yml"));
    }

    #[test]
    fn test_no_yaml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("values.json"), "{}").unwrap();
        assert!(find_config_document(dir.path()).is_none());
        assert!(find_config_document(&dir.path().join("missing")).is_none());
    }
}
