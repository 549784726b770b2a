//! Opening the durable board of a game session.

use derive_more::{Display, Error};
use tracing::{debug, info, instrument};

use crate::db::{DbError, Repository};
use crate::{AppConfig, BoardStore, PreferenceStore, StorageError};

/// Preference key remembering the last opened session.
pub const GAME_ID_KEY: &str = "GAME_ID_KEY";

/// Session bootstrap error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Session error: {} at {}:{}", message, file, line)]
pub struct SessionError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SessionError {
    /// Creates a new session error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<DbError> for SessionError {
    #[track_caller]
    fn from(err: DbError) -> Self {
        Self::new(err.message)
    }
}

impl From<StorageError> for SessionError {
    #[track_caller]
    fn from(err: StorageError) -> Self {
        Self::new(err.message)
    }
}

impl From<std::io::Error> for SessionError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

/// Resolves a session id to its durable board store.
#[async_trait::async_trait]
pub trait SessionBootstrap: Send + Sync {
    /// Opens (creating if needed) the store of `session_id`.
    async fn open(&self, session_id: &str) -> Result<BoardStore, SessionError>;
}

/// Bootstrap backed by the local data directory.
#[derive(Debug, Clone)]
pub struct LocalSessionBootstrap {
    config: AppConfig,
}

impl LocalSessionBootstrap {
    /// Creates a bootstrap for the locations in `config`.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Session id remembered by the last [`SessionBootstrap::open`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the preference file is unreadable.
    #[instrument(skip(self))]
    pub fn last_session_id(&self) -> Result<Option<String>, SessionError> {
        let prefs = PreferenceStore::open(self.config.preferences_path())?;
        Ok(prefs.get_string(GAME_ID_KEY).map(str::to_string))
    }
}

#[async_trait::async_trait]
impl SessionBootstrap for LocalSessionBootstrap {
    #[instrument(skip(self))]
    async fn open(&self, session_id: &str) -> Result<BoardStore, SessionError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(SessionError::new("Session id must not be empty"));
        }

        tokio::fs::create_dir_all(self.config.data_dir()).await?;

        let db_path = self.config.database_path().to_string_lossy().into_owned();
        let repository = Repository::new(db_path)?;
        let migrating = repository.clone();
        let applied = tokio::task::spawn_blocking(move || migrating.run_migrations())
            .await
            .map_err(|e| SessionError::new(format!("Migration task failed: {}", e)))??;
        debug!(applied, "Database ready");

        let mut prefs = PreferenceStore::open(self.config.preferences_path())?;
        prefs.set_string(GAME_ID_KEY, session_id);
        prefs.save()?;

        info!(session_id, "Session opened");
        Ok(BoardStore::open(repository, session_id.to_string()))
    }
}
