//! Counters as rows in the relational database.

use std::path::PathBuf;

use tracing::{debug, instrument};

use super::{Backend, CounterError, HitCounter, HitCounts, Modifier};
use crate::db::{HitCountEntry, Repository};

/// One `hit_count_entries` row per modifier, keyed by its key code.
#[derive(Debug, Clone)]
pub struct SqliteCounter {
    repository: Repository,
    counts: HitCounts,
}

impl SqliteCounter {
    /// Opens and migrates the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError`] if the database cannot be opened or migrated.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn open(path: PathBuf) -> Result<Self, CounterError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let repository = Repository::new(path.to_string_lossy().into_owned())?;
        repository.run_migrations()?;
        Ok(Self {
            repository,
            counts: HitCounts::default(),
        })
    }
}

impl HitCounter for SqliteCounter {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    #[instrument(skip(self))]
    fn load_on_startup(&mut self) -> Result<(), CounterError> {
        let mut counts = HitCounts::default();
        for entry in self.repository.load_hit_counts()? {
            let modifier = Modifier::from_key_code(*entry.id());
            if modifier.key_code() != *entry.id() {
                debug!(id = entry.id(), "Unknown key code skipped");
                continue;
            }
            match modifier {
                Modifier::None => counts.unmodified = *entry.value(),
                Modifier::Shift => counts.shift = *entry.value(),
                Modifier::Control => counts.control = *entry.value(),
            }
        }
        self.counts = counts;
        debug!(counts = ?self.counts, "Counts loaded");
        Ok(())
    }

    #[instrument(skip(self))]
    fn on_interaction(&mut self, modifier: Modifier) -> Result<(), CounterError> {
        let value = self.counts.increment(modifier);
        self.repository
            .save_hit_count(HitCountEntry::new(modifier.key_code(), value))?;
        Ok(())
    }

    fn counts(&self) -> HitCounts {
        self.counts
    }
}

