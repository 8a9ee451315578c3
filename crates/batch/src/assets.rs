//! Map background image catalog.
//!
//! Loaded once at startup and shared read-only across workers.

use rounds_core::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Map name to background image path.
#[derive(Debug, Clone, Default)]
pub struct MapAssets {
    images: BTreeMap<String, PathBuf>,
}

impl MapAssets {
    /// Catalog with no images.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index every `<map_name>.png` directly inside `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::config(format!(
                "maps background directory not found: {}",
                dir.display()
            )));
        }

        let images: BTreeMap<String, PathBuf> = walkdir::WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry
                        .path()
                        .extension()
                        .map(|ext| ext.eq_ignore_ascii_case("png"))
                        .unwrap_or(false)
            })
            .filter_map(|entry| {
                let name = entry.path().file_stem()?.to_str()?.to_string();
                Some((name, entry.into_path()))
            })
            .collect();

        debug!(maps = images.len(), dir = %dir.display(), "loaded map assets");
        Ok(Self { images })
    }

    /// Build the catalog named by the configuration, empty when unset.
    pub fn from_config(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::load(dir),
            None => Ok(Self::empty()),
        }
    }

    pub fn get(&self, map_name: &str) -> Option<&Path> {
        self.images.get(map_name).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Register an image without touching the filesystem.
    pub fn insert(&mut self, map_name: impl Into<String>, path: impl Into<PathBuf>) {
        self.images.insert(map_name.into(), path.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_indexes_png_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("de_mirage.png"), b"").unwrap();
        fs::write(dir.path().join("de_inferno.PNG"), b"").unwrap();
        fs::write(dir.path().join("readme.md"), b"").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/de_nuke.png"), b"").unwrap();

        let assets = MapAssets::load(dir.path()).unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets.get("de_mirage"), Some(dir.path().join("de_mirage.png").as_path()));
        assert!(assets.get("de_inferno").is_some());
        assert!(assets.get("de_nuke").is_none());
    }

    #[test]
    fn test_missing_dir_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MapAssets::load(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_config_without_dir() {
        assert!(MapAssets::from_config(None).unwrap().is_empty());
    }
}
