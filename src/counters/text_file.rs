//! Counters as three lines of text.

use std::path::PathBuf;

use tracing::{debug, instrument, warn};

use super::{Backend, CounterError, HitCounter, HitCounts, Modifier};

pub(crate) const FILE_NAME: &str = "hitCountFileExtended.txt";

/// One counter per line: unmodified, shift, control.
///
/// A file without exactly three lines is ignored; a line that is not an
/// integer is an error.
#[derive(Debug, Clone)]
pub struct TextFileCounter {
    path: PathBuf,
    counts: HitCounts,
}

impl TextFileCounter {
    /// Creates a counter persisted at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            counts: HitCounts::default(),
        }
    }
}

impl HitCounter for TextFileCounter {
    fn backend(&self) -> Backend {
        Backend::TextFile
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load_on_startup(&mut self) -> Result<(), CounterError> {
        if !self.path.exists() {
            debug!("No counter file yet");
            return Ok(());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let lines: Vec<&str> = content.lines().collect();
        if lines.len() != 3 {
            warn!(lines = lines.len(), "Expected three lines, file ignored");
            return Ok(());
        }
        self.counts = HitCounts {
            unmodified: lines[0].trim().parse()?,
            shift: lines[1].trim().parse()?,
            control: lines[2].trim().parse()?,
        };
        debug!(counts = ?self.counts, "Counts loaded");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn on_interaction(&mut self, modifier: Modifier) -> Result<(), CounterError> {
        self.counts.increment(modifier);
        let lines = [self.counts.unmodified, self.counts.shift, self.counts.control]
            .map(|v| v.to_string())
            .join("\n");
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, lines + "\n")?;
        Ok(())
    }

    fn counts(&self) -> HitCounts {
        self.counts
    }
}
