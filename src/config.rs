//! Application configuration loaded from TOML.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{PieceKind, PrefabCatalog};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "board_keeper.toml";

/// Storage locations, log filter and piece glyphs.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding every persisted file.
    data_dir: PathBuf,

    /// SQLite database file name, relative to `data_dir`.
    database_file: String,

    /// Preference store file name, relative to `data_dir`.
    preferences_file: String,

    /// Document store file name, relative to `data_dir`.
    documents_file: String,

    /// Fallback tracing filter when `RUST_LOG` is unset.
    log_filter: String,

    /// Piece kind name (e.g. `WhiteKing`) to glyph. Replaces the standard
    /// catalog entirely when non-empty.
    prefabs: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".board_keeper"),
            database_file: "board_keeper.db".to_string(),
            preferences_file: "preferences.toml".to_string(),
            documents_file: "documents.json".to_string(),
            log_filter: "info".to_string(),
            prefabs: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(data_dir = %config.data_dir.display(), "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but is invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Full path of the SQLite database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    /// Full path of the preference store.
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(&self.preferences_file)
    }

    /// Full path of the document store.
    pub fn documents_path(&self) -> PathBuf {
        self.data_dir.join(&self.documents_file)
    }

    /// Directory of the file-based hit counters.
    pub fn counters_dir(&self) -> PathBuf {
        self.data_dir.join("counters")
    }

    /// Glyph catalog for the text presenter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown kind name or a glyph that is
    /// not exactly one character.
    #[instrument(skip(self))]
    pub fn prefab_catalog(&self) -> Result<PrefabCatalog, ConfigError> {
        if self.prefabs.is_empty() {
            return Ok(PrefabCatalog::standard());
        }
        let mut glyphs = HashMap::new();
        for (name, glyph) in &self.prefabs {
            let kind = PieceKind::from_str(name)
                .map_err(|_| ConfigError::new(format!("Unknown piece kind '{}'", name)))?;
            let mut chars = glyph.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return Err(ConfigError::new(format!(
                    "Glyph for {} must be one character, got '{}'",
                    name, glyph
                )));
            };
            glyphs.insert(kind, c);
        }
        debug!(kinds = glyphs.len(), "Custom prefab catalog");
        Ok(PrefabCatalog::from_glyphs(glyphs))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
