//! Counters as three integer preferences.

use std::path::PathBuf;

use tracing::{debug, instrument};

use super::{Backend, CounterError, HitCounter, HitCounts, Modifier};
use crate::PreferenceStore;

const KEY_UNMODIFIED: &str = "HitCountKeyUnmodified";
const KEY_SHIFT: &str = "HitCountKeyShift";
const KEY_CONTROL: &str = "HitCountKeyControl";

fn key_for(modifier: Modifier) -> &'static str {
    match modifier {
        Modifier::None => KEY_UNMODIFIED,
        Modifier::Shift => KEY_SHIFT,
        Modifier::Control => KEY_CONTROL,
    }
}

/// One preference key per modifier.
#[derive(Debug, Clone)]
pub struct PrefsCounter {
    prefs: PreferenceStore,
    counts: HitCounts,
}

impl PrefsCounter {
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

impl HitCounter for PrefsCounter {
    fn backend(&self) -> Backend {
        Backend::Prefs
    }

    #[instrument(skip(self))]
    fn load_on_startup(&mut self) -> Result<(), CounterError> {
        self.counts = HitCounts {
            unmodified: self.prefs.get_int(KEY_UNMODIFIED).unwrap_or(0),
            shift: self.prefs.get_int(KEY_SHIFT).unwrap_or(0),
            control: self.prefs.get_int(KEY_CONTROL).unwrap_or(0),
        };
        debug!(counts = ?self.counts, "Counts loaded");
        Ok(())
    }

    #[instrument(skip(self))]
    fn on_interaction(&mut self, modifier: Modifier) -> Result<(), CounterError> {
        let value = self.counts.increment(modifier);
        self.prefs.set_int(key_for(modifier), value);
        self.prefs.save()?;
        Ok(())
    }

    fn counts(&self) -> HitCounts {
        self.counts
    }
}
