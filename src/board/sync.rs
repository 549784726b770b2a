//! Keeps one presentation proxy per live piece record.

use std::collections::BTreeMap;

use derive_getters::Getters;
use tracing::{debug, error, info, instrument};

use crate::{
    BoardStore, ChangeSet, Notification, PieceId, PieceKind, PieceRecord, PositionValue, Presenter,
    Subscription, SyncError,
};

/// Mirror of one persisted piece held by the presentation layer.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct PresentationPiece {
    id: PieceId,
    kind: PieceKind,
    position: PositionValue,
    selected: bool,
}

/// Applies store notifications to a [`Presenter`].
///
/// The first notification decides between resuming (records exist) and
/// starting a new game (store empty). Later batches spawn, reposition and
/// destroy proxies by id.
#[derive(Debug)]
pub struct BoardSync<P> {
    store: BoardStore,
    subscription: Subscription,
    presenter: P,
    pieces: BTreeMap<PieceId, PresentationPiece>,
    initialized: bool,
    created_new_game: bool,
}

impl<P: Presenter> BoardSync<P> {
    /// Subscribes to `store` and mirrors it into `presenter`.
    #[instrument(skip_all, fields(session_id = %store.session_id()))]
    pub fn new(store: BoardStore, presenter: P) -> Self {
        let subscription = store.subscribe();
        Self {
            store,
            subscription,
            presenter,
            pieces: BTreeMap::new(),
            initialized: false,
            created_new_game: false,
        }
    }

    /// Handles every queued notification. Returns how many were handled.
    ///
    /// # Errors
    ///
    /// [`SyncError::MissingPrefab`] is fatal; [`SyncError::Store`] means the
    /// new-game setup could not be written.
    #[instrument(skip(self))]
    pub fn pump(&mut self) -> Result<usize, SyncError> {
        let mut handled = 0;
        while let Some(notification) = self.subscription.try_next() {
            handled += 1;
            match notification {
                Notification::Initial(records) => self.on_initial(records)?,
                Notification::Changed(changes) => self.on_changed(changes)?,
                Notification::Error(e) => error!(error = %e, "Store notification failed"),
            }
        }
        Ok(handled)
    }

    fn on_initial(&mut self, records: Vec<PieceRecord>) -> Result<(), SyncError> {
        self.initialized = true;
        if records.is_empty() {
            info!("No saved game, creating a new board");
            self.store.initialize_standard_setup()?;
            self.created_new_game = true;
            return Ok(());
        }
        info!(pieces = records.len(), "Resuming saved game");
        for record in &records {
            self.spawn(record)?;
        }
        Ok(())
    }

    fn on_changed(&mut self, changes: ChangeSet) -> Result<(), SyncError> {
        debug!(
            inserted = changes.inserted().len(),
            updated = changes.updated().len(),
            deleted = changes.deleted().len(),
            "Applying change set"
        );
        for id in changes.deleted() {
            if self.pieces.remove(id).is_some() {
                self.presenter.destroy(*id);
            }
        }
        for record in changes.inserted() {
            self.spawn(record)?;
        }
        for record in changes.updated() {
            match self.pieces.get_mut(record.id()) {
                Some(piece) => {
                    piece.position = *record.position();
                    self.presenter.reposition(piece.id, piece.position);
                }
                None => debug!(piece = %record.id(), "Update for unmirrored piece ignored"),
            }
        }
        Ok(())
    }

    fn spawn(&mut self, record: &PieceRecord) -> Result<(), SyncError> {
        let kind = *record.kind();
        if !self.presenter.has_prefab(kind) {
            error!(kind = %kind, "No prefab for piece kind");
            return Err(SyncError::MissingPrefab { kind });
        }
        if self.pieces.contains_key(record.id()) {
            debug!(piece = %record.id(), "Piece already mirrored");
            return Ok(());
        }
        self.presenter.spawn(*record.id(), kind, *record.position());
        self.pieces.insert(
            *record.id(),
            PresentationPiece {
                id: *record.id(),
                kind,
                position: *record.position(),
                selected: false,
            },
        );
        Ok(())
    }

    /// Highlights a mirrored piece.
    pub fn select(&mut self, id: PieceId) {
        if let Some(piece) = self.pieces.get_mut(&id) {
            piece.selected = true;
            self.presenter.mark_selected(id);
        }
    }

    /// Clears the highlight of a mirrored piece.
    pub fn deselect(&mut self, id: PieceId) {
        if let Some(piece) = self.pieces.get_mut(&id) {
            piece.selected = false;
            self.presenter.mark_deselected(id);
        }
    }

    /// Whether the initial notification has been handled.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether the initial notification found an empty store and this mirror
    /// wrote the standard setup.
    pub fn created_new_game(&self) -> bool {
        self.created_new_game
    }

    /// Mirror of a piece by id.
    pub fn piece(&self, id: PieceId) -> Option<&PresentationPiece> {
        self.pieces.get(&id)
    }

    /// Mirror of the piece drawn at `position`.
    pub fn piece_at(&self, position: PositionValue) -> Option<&PresentationPiece> {
        self.pieces.values().find(|p| p.position == position)
    }

    /// All mirrored pieces, ordered by id.
    pub fn pieces(&self) -> impl Iterator<Item = &PresentationPiece> {
        self.pieces.values()
    }

    /// The presenter.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// The store this mirror follows.
    pub fn store(&self) -> &BoardStore {
        &self.store
    }
}
