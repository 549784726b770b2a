//! Key-value preference store persisted as a TOML table.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::StorageError;

/// String and integer preferences, written to disk on [`PreferenceStore::save`].
///
/// Several stores may share one file. Each remembers the keys it changed and
/// `save` merges only those into the file's current content.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    values: toml::Table,
    changed: BTreeSet<String>,
}

impl PreferenceStore {
    /// Opens the store at `path`. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file exists but cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let values = read_table(&path)?;
        info!(keys = values.len(), "Preferences loaded");
        Ok(Self {
            path,
            values,
            changed: BTreeSet::new(),
        })
    }

    /// Whether `key` holds any value.
    pub fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Integer stored under `key`. Non-integer values read as `None`.
    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.values
            .get(key)
            .and_then(toml::Value::as_integer)
            .and_then(|v| i32::try_from(v).ok())
    }

    /// Stores an integer under `key`.
    pub fn set_int(&mut self, key: &str, value: i32) {
        self.values
            .insert(key.to_string(), toml::Value::Integer(i64::from(value)));
        self.changed.insert(key.to_string());
    }

    /// String stored under `key`. Non-string values read as `None`.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(toml::Value::as_str)
    }

    /// Stores a string under `key`.
    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.values
            .insert(key.to_string(), toml::Value::String(value.into()));
        self.changed.insert(key.to_string());
    }

    /// Writes the keys changed through this store to disk, keeping every
    /// other key as it currently is in the file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file cannot be read back or written.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn save(&mut self) -> Result<(), StorageError> {
        let mut merged = read_table(&self.path)?;
        for key in &self.changed {
            if let Some(value) = self.values.get(key) {
                merged.insert(key.clone(), value.clone());
            }
        }
        let content = toml::to_string(&merged)
            .map_err(|e| StorageError::new(format!("Failed to serialize preferences: {}", e)))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content)?;
        debug!(keys = merged.len(), changed = self.changed.len(), "Preferences saved");
        self.values = merged;
        self.changed.clear();
        Ok(())
    }
}

fn read_table(path: &Path) -> Result<toml::Table, StorageError> {
    if !path.exists() {
        debug!("No preferences file yet");
        return Ok(toml::Table::new());
    }
    std::fs::read_to_string(path)?
        .parse::<toml::Table>()
        .map_err(|e| StorageError::new(format!("Failed to parse preferences: {}", e)))
}
