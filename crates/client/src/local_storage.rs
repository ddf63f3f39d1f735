//! File-backed `LocalStorage`: one file per key under the cache directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quickorder_panel::{LocalStorage, StorageError};

#[derive(Debug, Clone)]
pub struct FileLocalStorage {
    dir: PathBuf,
}

impl FileLocalStorage {
    /// Create the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create cache directory at {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path).with_context(|| format!("failed to move {} into place", path.display()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
        }
    }
}

fn io_error(err: anyhow::Error) -> StorageError {
    StorageError::Io(format!("{err:#}"))
}

impl LocalStorage for FileLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.read(key).map_err(io_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write(key, value).map_err(io_error)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.remove(key).map_err(io_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickorder_core::{PanelId, UserId};
    use quickorder_panel::panel_cache_key;

    #[test]
    fn items_persist_across_instances() {
        let tmp = tempfile::tempdir().unwrap();
        let key = panel_cache_key(&UserId::new("planner-7"), &PanelId::new("billing-details"));

        let storage = FileLocalStorage::open(tmp.path().join("cache")).unwrap();
        assert_eq!(storage.get_item(&key).unwrap(), None);
        storage.set_item(&key, r#"{"title":"Billing"}"#).unwrap();

        let reopened = FileLocalStorage::open(tmp.path().join("cache")).unwrap();
        assert_eq!(reopened.get_item(&key).unwrap().as_deref(), Some(r#"{"title":"Billing"}"#));

        reopened.remove_item(&key).unwrap();
        reopened.remove_item(&key).unwrap();
        assert_eq!(storage.get_item(&key).unwrap(), None);
    }

    #[test]
    fn keys_are_mapped_to_safe_file_names() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileLocalStorage::open(tmp.path()).unwrap();
        storage.set_item("../escape/attempt", "x").unwrap();
        assert!(storage.dir().join("___escape_attempt.json").exists());
    }
}
