//! Click routing state machine.

use tracing::{debug, instrument};

use crate::{InputEvent, PieceId, PositionValue};

/// Selection state of the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouterState {
    /// Nothing selected.
    #[default]
    Idle,
    /// A piece is selected and waits for a destination square.
    PieceSelected(PieceId),
}

/// Command emitted by the router for the controller to carry out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouterAction {
    /// Highlight a piece.
    Select(PieceId),
    /// Remove a piece's highlight.
    Deselect(PieceId),
    /// Move a piece to a square.
    Move {
        /// The selected piece.
        piece: PieceId,
        /// The clicked square.
        to: PositionValue,
    },
}

/// Turns clicks into select, deselect and move commands.
///
/// No move legality is checked: any square is a valid destination.
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    state: RouterState,
}

impl InputRouter {
    /// Creates an idle router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> RouterState {
        self.state
    }

    /// Currently selected piece, if any.
    pub fn selected(&self) -> Option<PieceId> {
        match self.state {
            RouterState::Idle => None,
            RouterState::PieceSelected(id) => Some(id),
        }
    }

    /// Advances the state machine and returns the actions to perform, in order.
    #[instrument(skip(self), fields(state = ?self.state))]
    pub fn handle(&mut self, event: InputEvent) -> Vec<RouterAction> {
        let (next, actions) = match (self.state, event) {
            (RouterState::Idle, InputEvent::PieceClicked(piece)) => {
                (RouterState::PieceSelected(piece), vec![RouterAction::Select(piece)])
            }
            (RouterState::PieceSelected(current), InputEvent::PieceClicked(piece)) => (
                RouterState::PieceSelected(piece),
                vec![RouterAction::Deselect(current), RouterAction::Select(piece)],
            ),
            (RouterState::PieceSelected(piece), InputEvent::SquareClicked(to)) => (
                RouterState::Idle,
                vec![RouterAction::Move { piece, to }, RouterAction::Deselect(piece)],
            ),
            (RouterState::Idle, InputEvent::SquareClicked(_)) => (RouterState::Idle, Vec::new()),
        };
        debug!(next = ?next, actions = actions.len(), "Input routed");
        self.state = next;
        actions
    }
}
