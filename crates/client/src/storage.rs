//! Persistent key-value storage.
//!
//! Each key is a JSON file in the storage directory. The default directory
//! is platform-appropriate:
//!   - Linux: `~/.config/reverb-tester/`
//!   - macOS: `~/Library/Application Support/reverb-tester/`
//!   - Windows: `%APPDATA%\reverb-tester\`

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};

const APP_DIR: &str = "reverb-tester";

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Storage rooted at an explicit directory (created on first write).
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage in the platform config directory.
    pub fn default_location() -> Option<Self> {
        let config_dir = dirs::config_dir()?;
        Some(Self::at(config_dir.join(APP_DIR)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Save a value to persistent storage.
    ///
    /// Returns `true` if the operation succeeded; failures are logged.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match self.try_save(key, value) {
            Ok(()) => true,
            Err(e) => {
                crate::log_warn!("storage: {:#}", e);
                false
            }
        }
    }

    fn try_save<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let path = self
            .file_path(key)
            .ok_or_else(|| anyhow::anyhow!("empty storage key"))?;
        let json = serde_json::to_string(value).with_context(|| format!("serialize '{key}'"))?;
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("create {}", self.root.display()))?;
        std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    /// Load a value from persistent storage.
    ///
    /// Returns `None` if the key doesn't exist or deserialization fails.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = self.load_raw(key)?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                crate::log_warn!("storage: ignoring unreadable '{}': {}", key, e);
                None
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Some(path) = self.file_path(key) {
            let _ = std::fs::remove_file(path);
        }
    }

    pub fn exists(&self, key: &str) -> bool {
        self.file_path(key).map(|p| p.exists()).unwrap_or(false)
    }

    fn file_path(&self, key: &str) -> Option<PathBuf> {
        if key.is_empty() {
            return None;
        }
        // Sanitize key to be a valid filename
        let safe_key = key.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
        Some(self.root.join(format!("{}.json", safe_key)))
    }

    fn load_raw(&self, key: &str) -> Option<String> {
        let path = self.file_path(key)?;
        std::fs::read_to_string(path).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path().join("nested"));

        assert!(storage.save("numbers", &vec![1, 2, 3]));
        assert!(storage.exists("numbers"));
        assert_eq!(storage.load::<Vec<i32>>("numbers"), Some(vec![1, 2, 3]));

        storage.remove("numbers");
        assert!(!storage.exists("numbers"));
        assert_eq!(storage.load::<Vec<i32>>("numbers"), None);
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path());

        assert!(storage.save("a/b:c", &"x"));
        assert!(dir.path().join("a_b_c.json").exists());
    }

    #[test]
    fn corrupt_values_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path());
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();

        assert_eq!(storage.load::<Vec<String>>("broken"), None);
    }

    #[test]
    fn unwritable_root_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let storage = Storage::at(blocker.join("inner"));

        assert!(!storage.save("key", &1));
        assert!(!storage.save("", &1));
    }
}
