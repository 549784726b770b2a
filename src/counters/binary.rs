//! Single counter as a raw little-endian integer.

use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

use tracing::{debug, instrument};

use super::{Backend, CounterError, HitCounter, HitCounts, Modifier};

pub(crate) const FILE_NAME: &str = "BinaryReaderWriterExample";

/// Four bytes on disk. Modifiers are not tracked: every click is unmodified.
#[derive(Debug, Clone)]
pub struct BinaryCounter {
    path: PathBuf,
    hit_count: i32,
}

impl BinaryCounter {
    /// Creates a counter persisted at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path, hit_count: 0 }
    }
}

impl HitCounter for BinaryCounter {
    fn backend(&self) -> Backend {
        Backend::Binary
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load_on_startup(&mut self) -> Result<(), CounterError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut buf = [0u8; 4];
        File::open(&self.path)?
            .read_exact(&mut buf)
            .map_err(|e| CounterError::new(format!("Truncated counter file: {}", e)))?;
        self.hit_count = i32::from_le_bytes(buf);
        debug!(hit_count = self.hit_count, "Count loaded");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn on_interaction(&mut self, _modifier: Modifier) -> Result<(), CounterError> {
        self.hit_count += 1;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        File::create(&self.path)?.write_all(&self.hit_count.to_le_bytes())?;
        Ok(())
    }

    fn counts(&self) -> HitCounts {
        HitCounts {
            unmodified: self.hit_count,
            ..HitCounts::default()
        }
    }
}
