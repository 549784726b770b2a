//! Input event bus and the controller that applies moves.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, instrument, warn};

use crate::{
    BoardStore, BoardSync, InputRouter, MoveOutcome, PieceId, PositionValue, Presenter,
    RouterAction, SyncError,
};

/// A click reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A piece proxy was clicked.
    PieceClicked(PieceId),
    /// A board square was clicked.
    SquareClicked(PositionValue),
}

/// Channel connecting click sources to a [`GameController`].
#[derive(Debug)]
pub struct EventBus;

impl EventBus {
    /// Creates a connected emitter/receiver pair.
    pub fn channel() -> (InputEmitter, InputEvents) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (InputEmitter { sender }, InputEvents { receiver })
    }
}

/// Sending side of the event bus, handed to whatever reports clicks.
#[derive(Debug, Clone)]
pub struct InputEmitter {
    sender: UnboundedSender<InputEvent>,
}

impl InputEmitter {
    /// Reports a click on a piece.
    pub fn piece_clicked(&self, id: PieceId) {
        self.emit(InputEvent::PieceClicked(id));
    }

    /// Reports a click on a square.
    pub fn square_clicked(&self, position: PositionValue) {
        self.emit(InputEvent::SquareClicked(position));
    }

    fn emit(&self, event: InputEvent) {
        if self.sender.send(event).is_err() {
            warn!(?event, "Event bus closed, click dropped");
        }
    }
}

/// Receiving side of the event bus.
#[derive(Debug)]
pub struct InputEvents {
    receiver: UnboundedReceiver<InputEvent>,
}

impl InputEvents {
    fn try_next(&mut self) -> Option<InputEvent> {
        self.receiver.try_recv().ok()
    }
}

/// Drives one game session: clicks in, store writes out, mirror kept current.
#[derive(Debug)]
pub struct GameController<P> {
    store: BoardStore,
    sync: BoardSync<P>,
    router: InputRouter,
    events: InputEvents,
    fresh_board: bool,
}

impl<P: Presenter> GameController<P> {
    /// Wires a controller to a store, a presenter and the receiving end of an
    /// [`EventBus`].
    #[instrument(skip_all, fields(session_id = %store.session_id()))]
    pub fn new(store: BoardStore, presenter: P, events: InputEvents) -> Self {
        info!("Creating GameController");
        let sync = BoardSync::new(store.clone(), presenter);
        Self {
            store,
            sync,
            router: InputRouter::new(),
            events,
            fresh_board: false,
        }
    }

    /// Handles the initial notification and, for a new game, the setup batch.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the board cannot be mirrored.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<(), SyncError> {
        while self.sync.pump()? > 0 {}
        if !self.sync.is_initialized() {
            warn!("Initial notification not received");
        }
        self.fresh_board = self.sync.created_new_game();
        Ok(())
    }

    /// Applies all queued clicks, then all queued store notifications.
    /// Returns the number of clicks handled.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if a move cannot be written or mirrored.
    #[instrument(skip(self))]
    pub fn process_pending(&mut self) -> Result<usize, SyncError> {
        let mut handled = 0;
        while let Some(event) = self.events.try_next() {
            handled += 1;
            for action in self.router.handle(event) {
                self.apply(action)?;
            }
        }
        self.sync.pump()?;
        Ok(handled)
    }

    fn apply(&mut self, action: RouterAction) -> Result<(), SyncError> {
        match action {
            RouterAction::Select(id) => self.sync.select(id),
            RouterAction::Deselect(id) => self.sync.deselect(id),
            RouterAction::Move { piece, to } => {
                let Some(from) = self.sync.piece(piece).map(|p| *p.position()) else {
                    warn!(piece = %piece, "Selected piece no longer on the board");
                    return Ok(());
                };
                let outcome = self.store.apply_move(from, to)?;
                if matches!(outcome, MoveOutcome::Moved { .. } | MoveOutcome::Captured { .. }) {
                    self.fresh_board = false;
                }
                if outcome == MoveOutcome::SourceMissing {
                    warn!(
                        piece = %piece,
                        from = %from,
                        "Store has no piece where the mirror shows one"
                    );
                }
                debug!(?outcome, "Move applied");
            }
        }
        Ok(())
    }

    /// Clears the board and writes a fresh standard setup.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the setup cannot be written or mirrored.
    #[instrument(skip(self))]
    pub fn reset_game(&mut self) -> Result<(), SyncError> {
        if let Some(selected) = self.router.selected() {
            self.sync.deselect(selected);
        }
        self.router = InputRouter::new();
        self.store.initialize_standard_setup()?;
        self.sync.pump()?;
        self.fresh_board = true;
        Ok(())
    }

    /// Starts a new game unless the board already is an untouched standard
    /// setup written by this controller.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the setup cannot be written or mirrored.
    #[instrument(skip(self))]
    pub fn new_game(&mut self) -> Result<(), SyncError> {
        if self.fresh_board {
            debug!("Board is already a new game");
            return Ok(());
        }
        self.reset_game()
    }

    /// The mirror.
    pub fn sync(&self) -> &BoardSync<P> {
        &self.sync
    }

    /// The router.
    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    /// The store.
    pub fn store(&self) -> &BoardStore {
        &self.store
    }
}
