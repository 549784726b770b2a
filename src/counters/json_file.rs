//! Counters as a JSON document in a file.

use std::path::PathBuf;

use tracing::{debug, instrument};

use super::{Backend, CounterError, HitCounter, HitCounts, Modifier};

pub(crate) const FILE_NAME: &str = "hitCountFileJson.txt";

/// Pretty-printed [`HitCounts`] JSON.
#[derive(Debug, Clone)]
pub struct JsonFileCounter {
    path: PathBuf,
    counts: HitCounts,
}

impl JsonFileCounter {
    /// Creates a counter persisted at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            counts: HitCounts::default(),
        }
    }
}

impl HitCounter for JsonFileCounter {
    fn backend(&self) -> Backend {
        Backend::JsonFile
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load_on_startup(&mut self) -> Result<(), CounterError> {
        if !self.path.exists() {
            return Ok(());
        }
        let content = std::fs::read_to_string(&self.path)?;
        self.counts = serde_json::from_str(&content)?;
        debug!(counts = ?self.counts, "Counts loaded");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn on_interaction(&mut self, modifier: Modifier) -> Result<(), CounterError> {
        self.counts.increment(modifier);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.counts)?)?;
        Ok(())
    }

    fn counts(&self) -> HitCounts {
        self.counts
    }
}
