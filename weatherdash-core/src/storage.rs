use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const FAVORITES_KEY: &str = "favorites";
pub const ALERTS_KEY: &str = "weatherAlerts";
pub const HISTORY_KEY: &str = "history";

/// Per-user key/value storage: each key is one JSON document in `dir`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read the document stored under `key`, or `T::default()` if none exists.
    pub fn read<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(T::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory: {}", self.dir.display()))?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize '{key}'"))?;

        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        tracing::debug!(key, path = %path.display(), "local store written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let value: Vec<String> = store.read("nothing").unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn write_then_read_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("data"));

        store.write(FAVORITES_KEY, &vec!["Oslo".to_string()]).unwrap();
        let value: Vec<String> = store.read(FAVORITES_KEY).unwrap();
        assert_eq!(value, vec!["Oslo".to_string()]);
        assert!(dir.path().join("data").join("favorites.json").exists());
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("weatherAlerts.json"), "{not json").unwrap();

        let store = LocalStore::new(dir.path());
        let err = store.read::<Vec<String>>(ALERTS_KEY).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
