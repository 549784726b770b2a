//! Counters as a document in the embedded document store.

use std::path::PathBuf;

use tracing::{debug, info, instrument};

use super::{Backend, CounterError, HitCounter, HitCounts, Modifier};
use crate::DocumentStore;

const COLLECTION: &str = "hit_counts";
const DOCUMENT_ID: i64 = 1;

/// A single [`HitCounts`] document, created on first load, updated in a
/// write transaction per click.
#[derive(Debug, Clone)]
pub struct DocumentCounter {
    store: DocumentStore,
    counts: HitCounts,
}

impl DocumentCounter {
    /// Opens the document store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError`] if the store file cannot be parsed.
    pub fn open(path: PathBuf) -> Result<Self, CounterError> {
        Ok(Self {
            store: DocumentStore::open(path)?,
            counts: HitCounts::default(),
        })
    }
}

impl HitCounter for DocumentCounter {
    fn backend(&self) -> Backend {
        Backend::Document
    }

    #[instrument(skip(self))]
    fn load_on_startup(&mut self) -> Result<(), CounterError> {
        match self.store.find::<HitCounts>(COLLECTION, DOCUMENT_ID)? {
            Some(counts) => {
                self.counts = counts;
                debug!(counts = ?self.counts, "Counts loaded");
            }
            None => {
                let counts = HitCounts::default();
                self.store
                    .write(|txn| txn.put(COLLECTION, DOCUMENT_ID, &counts))?;
                self.counts = counts;
                info!("Counter document created");
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn on_interaction(&mut self, modifier: Modifier) -> Result<(), CounterError> {
        let mut next = self.counts;
        next.increment(modifier);
        self.store
            .write(|txn| txn.put(COLLECTION, DOCUMENT_ID, &next))?;
        self.counts = next;
        Ok(())
    }

    fn counts(&self) -> HitCounts {
        self.counts
    }
}
