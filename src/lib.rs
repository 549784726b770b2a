//! Board Keeper library - a persisted chess board mirrored into a presenter
//!
//! The board lives in SQLite; the presentation layer only ever mirrors it.
//!
//! # Architecture
//!
//! - **Store**: [`BoardStore`] owns the piece records of one session and
//!   publishes a [`ChangeSet`] per committed transaction
//! - **Sync**: [`BoardSync`] applies those batches to a [`Presenter`]
//! - **Input**: [`InputRouter`] turns clicks into select/deselect/move actions,
//!   [`GameController`] writes the moves back to the store
//! - **Counters**: the same click counter persisted nine ways, see
//!   [`HitCounter`]
//!
//! # Example
//!
//! ```no_run
//! use board_keeper::{AppConfig, EventBus, GameController, LocalSessionBootstrap,
//!     SessionBootstrap, TextPresenter};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::default();
//! let store = LocalSessionBootstrap::new(config.clone()).open("game-1").await?;
//! let (emitter, events) = EventBus::channel();
//! let mut controller = GameController::new(store, TextPresenter::default(), events);
//! controller.start()?;
//! # drop(emitter);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod board;
mod config;
mod counters;
mod db;
mod session;
mod storage;

// Crate-level exports - Board model and store
pub use board::{
    BoardError, BoardStore, ChangeSet, MoveOutcome, Notification, PieceId, PieceKind,
    PieceRecord, PositionValue, Subscription, SubscriptionToken, SyncError, standard_layout,
};

// Crate-level exports - Presentation mirror and input
pub use board::{
    BoardSync, EventBus, GameController, InputEmitter, InputEvent, InputEvents, InputRouter,
    PrefabCatalog, PresentationPiece, Presenter, RouterAction, RouterState, TextPresenter,
};

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError, DEFAULT_CONFIG_FILE};

// Crate-level exports - Session bootstrap
pub use session::{GAME_ID_KEY, LocalSessionBootstrap, SessionBootstrap, SessionError};

// Crate-level exports - Persistence
pub use db::{DbError, HitCountEntry, Repository};
pub use storage::{DocumentStore, DocumentTransaction, PreferenceStore, StorageError};

// Crate-level exports - Hit counters
pub use counters::{
    Backend, BinaryCounter, CounterError, DocumentCounter, FileStreamCounter, HitCounter,
    HitCounts, JsonFileCounter, MemoryCounter, Modifier, PrefsCounter, PrefsJsonCounter,
    SqliteCounter, StreamStyle, TextFileCounter, open_counter,
};
