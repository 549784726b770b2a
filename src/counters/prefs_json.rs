//! Counters as one JSON string preference.

use std::path::PathBuf;

use tracing::{debug, instrument, warn};

use super::{Backend, CounterError, HitCounter, HitCounts, Modifier};
use crate::PreferenceStore;

const KEY: &str = "HitCountKeyJson";

/// Compact [`HitCounts`] JSON under a single preference key.
///
/// A stored value that does not parse is ignored and overwritten by the
/// next click.
#[derive(Debug, Clone)]
pub struct PrefsJsonCounter {
    prefs: PreferenceStore,
    counts: HitCounts,
}

impl PrefsJsonCounter {
    /// Opens the preference file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError`] if the preference file cannot be parsed.
    pub fn open(path: PathBuf) -> Result<Self, CounterError> {
        Ok(Self {
            prefs: PreferenceStore::open(path)?,
            counts: HitCounts::default(),
        })
    }
}

impl HitCounter for PrefsJsonCounter {
    fn backend(&self) -> Backend {
        Backend::PrefsJson
    }

    #[instrument(skip(self))]
    fn load_on_startup(&mut self) -> Result<(), CounterError> {
        let Some(json) = self.prefs.get_string(KEY) else {
            return Ok(());
        };
        match serde_json::from_str(json) {
            Ok(counts) => {
                self.counts = counts;
                debug!(counts = ?self.counts, "Counts loaded");
            }
            Err(e) => warn!(error = %e, "Stored counts unparsable, ignored"),
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn on_interaction(&mut self, modifier: Modifier) -> Result<(), CounterError> {
        self.counts.increment(modifier);
        self.prefs.set_string(KEY, serde_json::to_string(&self.counts)?);
        self.prefs.save()?;
        Ok(())
    }

    fn counts(&self) -> HitCounts {
        self.counts
    }
}
