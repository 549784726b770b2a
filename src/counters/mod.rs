//! The same click counter persisted nine different ways.
//!
//! Every variant loads its counts once with [`HitCounter::load_on_startup`]
//! (missing storage means zero) and writes them back on every
//! [`HitCounter::on_interaction`].

mod binary;
mod document;
mod error;
mod file_stream;
mod json_file;
mod memory;
mod prefs;
mod prefs_json;
mod sqlite;
mod text_file;

pub use binary::BinaryCounter;
pub use document::DocumentCounter;
pub use error::CounterError;
pub use file_stream::{FileStreamCounter, StreamStyle};
pub use json_file::JsonFileCounter;
pub use memory::MemoryCounter;
pub use prefs::PrefsCounter;
pub use prefs_json::PrefsJsonCounter;
pub use sqlite::SqliteCounter;
pub use text_file::TextFileCounter;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::instrument;

use crate::AppConfig;

/// Key held while clicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Modifier {
    /// No modifier.
    #[default]
    None,
    /// Shift held.
    Shift,
    /// Control held.
    Control,
}

impl Modifier {
    /// Key code used as the row id by the relational variant.
    pub const fn key_code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Shift => 304,
            Self::Control => 306,
        }
    }

    /// Inverse of [`Modifier::key_code`]; unknown codes count as unmodified.
    pub const fn from_key_code(code: i32) -> Self {
        match code {
            304 => Self::Shift,
            306 => Self::Control,
            _ => Self::None,
        }
    }
}

/// The three counters tracked by every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HitCounts {
    /// Clicks without modifier.
    pub unmodified: i32,
    /// Clicks with shift held.
    pub shift: i32,
    /// Clicks with control held.
    pub control: i32,
}

impl HitCounts {
    /// Counter for `modifier`.
    pub fn get(&self, modifier: Modifier) -> i32 {
        match modifier {
            Modifier::None => self.unmodified,
            Modifier::Shift => self.shift,
            Modifier::Control => self.control,
        }
    }

    /// Increments the counter for `modifier` and returns its new value.
    pub fn increment(&mut self, modifier: Modifier) -> i32 {
        let counter = match modifier {
            Modifier::None => &mut self.unmodified,
            Modifier::Shift => &mut self.shift,
            Modifier::Control => &mut self.control,
        };
        *counter += 1;
        *counter
    }
}

/// Storage mechanism behind a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Backend {
    /// Kept in memory only.
    Memory,
    /// Three lines of text.
    TextFile,
    /// One counter written through five stream styles.
    FileStream,
    /// One little-endian integer.
    Binary,
    /// A JSON document in a file.
    JsonFile,
    /// Three keys in the preference store.
    Prefs,
    /// One JSON string in the preference store.
    PrefsJson,
    /// A document in the embedded document store.
    Document,
    /// Rows in the embedded relational database.
    Sqlite,
}

/// A click counter bound to one storage mechanism.
pub trait HitCounter: std::fmt::Debug {
    /// Which storage this counter uses.
    fn backend(&self) -> Backend;

    /// Reads persisted counts. Missing storage leaves all counters at zero.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError`] if stored data is unreadable and the variant
    /// does not ignore it.
    fn load_on_startup(&mut self) -> Result<(), CounterError>;

    /// Counts one click and writes the counters back.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError`] if the write fails.
    fn on_interaction(&mut self, modifier: Modifier) -> Result<(), CounterError>;

    /// Current counts.
    fn counts(&self) -> HitCounts;
}

/// Builds the counter for `backend` with storage locations from `config`.
///
/// # Errors
///
/// Returns [`CounterError`] if the backing store cannot be opened.
#[instrument(skip(config))]
pub fn open_counter(
    backend: Backend,
    config: &AppConfig,
) -> Result<Box<dyn HitCounter>, CounterError> {
    let dir = config.counters_dir();
    let counter: Box<dyn HitCounter> = match backend {
        Backend::Memory => Box::new(MemoryCounter::new()),
        Backend::TextFile => Box::new(TextFileCounter::new(dir.join(text_file::FILE_NAME))),
        Backend::FileStream => Box::new(FileStreamCounter::new(dir)),
        Backend::Binary => Box::new(BinaryCounter::new(dir.join(binary::FILE_NAME))),
        Backend::JsonFile => Box::new(JsonFileCounter::new(dir.join(json_file::FILE_NAME))),
        Backend::Prefs => Box::new(PrefsCounter::open(config.preferences_path())?),
        Backend::PrefsJson => Box::new(PrefsJsonCounter::open(config.preferences_path())?),
        Backend::Document => Box::new(DocumentCounter::open(config.documents_path())?),
        Backend::Sqlite => Box::new(SqliteCounter::open(config.database_path())?),
    };
    Ok(counter)
}
