//! Embedded object-document store kept in a single JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, info, instrument};

use crate::StorageError;

type Collection = BTreeMap<i64, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct DocumentData {
    collections: BTreeMap<String, Collection>,
}

/// Named collections of JSON documents keyed by integer primary key.
///
/// Writes happen in [`DocumentStore::write`] transactions: the closure works
/// on a copy and the file is replaced (temp file + rename) only if it
/// succeeds.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
    data: DocumentData,
}

impl DocumentStore {
    /// Opens the store at `path`. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file exists but cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            DocumentData::default()
        };
        info!(collections = data.collections.len(), "Document store opened");
        Ok(Self { path, data })
    }

    /// Looks up a document by primary key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the stored document does not match `T`.
    #[instrument(skip(self))]
    pub fn find<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: i64,
    ) -> Result<Option<T>, StorageError> {
        self.data
            .collections
            .get(collection)
            .and_then(|c| c.get(&id))
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(StorageError::from)
    }

    /// Number of documents in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.data.collections.get(collection).map_or(0, BTreeMap::len)
    }

    /// Runs `f` as one all-or-nothing write transaction.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or [`StorageError`] if the file cannot be
    /// replaced. The in-memory state is unchanged in both cases.
    #[instrument(skip(self, f), fields(path = %self.path.display()))]
    pub fn write<T, F>(&mut self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut DocumentTransaction) -> Result<T, StorageError>,
    {
        let mut txn = DocumentTransaction {
            data: self.data.clone(),
        };
        let result = f(&mut txn)?;
        self.persist(&txn.data)?;
        self.data = txn.data;
        debug!("Write transaction committed");
        Ok(result)
    }

    fn persist(&self, data: &DocumentData) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(data)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Mutable view handed to [`DocumentStore::write`].
#[derive(Debug)]
pub struct DocumentTransaction {
    data: DocumentData,
}

impl DocumentTransaction {
    /// Inserts or replaces the document with primary key `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if `document` cannot be serialized.
    pub fn put<T: Serialize>(
        &mut self,
        collection: &str,
        id: i64,
        document: &T,
    ) -> Result<(), StorageError> {
        let value = serde_json::to_value(document)?;
        self.data
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, value);
        Ok(())
    }

    /// Removes a document. Returns whether it existed.
    pub fn remove(&mut self, collection: &str, id: i64) -> bool {
        self.data
            .collections
            .get_mut(collection)
            .is_some_and(|c| c.remove(&id).is_some())
    }

    /// Reads a document as seen inside this transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the stored document does not match `T`.
    pub fn find<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: i64,
    ) -> Result<Option<T>, StorageError> {
        self.data
            .collections
            .get(collection)
            .and_then(|c| c.get(&id))
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(StorageError::from)
    }
}
