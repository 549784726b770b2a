//! Counter without persistence.

use tracing::{debug, instrument};

use super::{Backend, CounterError, HitCounter, HitCounts, Modifier};

/// Baseline counter: starts at zero every run.
#[derive(Debug, Clone, Default)]
pub struct MemoryCounter {
    counts: HitCounts,
}

impl MemoryCounter {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl HitCounter for MemoryCounter {
    fn backend(&self) -> Backend {
        Backend::Memory
    }

    fn load_on_startup(&mut self) -> Result<(), CounterError> {
        self.counts = HitCounts::default();
        Ok(())
    }

    #[instrument(skip(self))]
    fn on_interaction(&mut self, modifier: Modifier) -> Result<(), CounterError> {
        let value = self.counts.increment(modifier);
        debug!(value, "Hit counted");
        Ok(())
    }

    fn counts(&self) -> HitCounts {
        self.counts
    }
}
