//! Persisted board state and its presentation mirror.

mod changes;
mod controller;
mod error;
mod input;
mod piece;
mod position;
mod presenter;
mod setup;
mod store;
mod sync;

pub use changes::{ChangeSet, Notification};
pub use controller::{EventBus, GameController, InputEmitter, InputEvent, InputEvents};
pub use error::{BoardError, SyncError};
pub use input::{InputRouter, RouterAction, RouterState};
pub use piece::{PieceId, PieceKind, PieceRecord};
pub use position::PositionValue;
pub use presenter::{PrefabCatalog, Presenter, TextPresenter};
pub use setup::standard_layout;
pub use store::{BoardStore, MoveOutcome, Subscription, SubscriptionToken};
pub use sync::{BoardSync, PresentationPiece};
