//! Key-value store with one JSON file per key.

use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use fitcheck_core::error::{FitCheckError, Result};
use fitcheck_core::storage::KeyValueStore;

/// A [`KeyValueStore`] writing each key to `<dir>/<key>.json`.
///
/// Writes go to a temporary file in the same directory, are synced, then
/// renamed over the target, so a reader never observes a partial value.
#[derive(Debug, Clone)]
pub struct JsonFileKeyValueStore {
    dir: PathBuf,
}

impl JsonFileKeyValueStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", sanitize_key(key)))
    }
}

/// Maps a key to a file stem: anything outside `[A-Za-z0-9_-]` becomes `_`.
fn sanitize_key(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() { "_".to_string() } else { stem }
}

impl KeyValueStore for JsonFileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| {
            FitCheckError::persistence(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            FitCheckError::persistence(format!(
                "Failed to create store directory '{}': {}",
                self.dir.display(),
                e
            ))
        })?;

        let path = self.path_for(key);
        let tmp_path = self.temp_path_for(key);
        let write = || -> std::io::Result<()> {
            let mut tmp_file = File::create(&tmp_path)?;
            tmp_file.write_all(value.as_bytes())?;
            tmp_file.sync_all()?;
            drop(tmp_file);
            fs::rename(&tmp_path, &path)
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            FitCheckError::persistence(format!("Failed to write '{}': {}", path.display(), e))
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FitCheckError::persistence(format!(
                "Failed to remove '{}': {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileKeyValueStore::new(temp_dir.path().join("store"));

        assert_eq!(store.get("fitcheck_wardrobe").unwrap(), None);
        store.set("fitcheck_wardrobe", r#"{"garments":[]}"#).unwrap();
        assert_eq!(
            store.get("fitcheck_wardrobe").unwrap().as_deref(),
            Some(r#"{"garments":[]}"#)
        );
        assert!(temp_dir.path().join("store/fitcheck_wardrobe.json").exists());

        store.remove("fitcheck_wardrobe").unwrap();
        store.remove("fitcheck_wardrobe").unwrap();
        assert_eq!(store.get("fitcheck_wardrobe").unwrap(), None);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileKeyValueStore::new(temp_dir.path());
        store.set("k", "v").unwrap();

        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["k.json".to_string()]);
    }

    #[test]
    fn test_keys_are_sanitized() {
        assert_eq!(sanitize_key("../etc/passwd"), "___etc_passwd");
        assert_eq!(sanitize_key(""), "_");
    }
}
