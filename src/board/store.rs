//! Durable piece collection for one session, with change notifications.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::{debug, info, instrument, warn};

use crate::board::setup::standard_layout;
use crate::db::Repository;
use crate::{BoardError, ChangeSet, Notification, PieceId, PieceRecord, PositionValue};

/// Result of [`BoardStore::apply_move`].
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The piece moved to an empty square.
    Moved {
        /// The moved piece at its new position.
        piece: PieceRecord,
    },
    /// The piece moved onto an occupied square and removed its occupant.
    Captured {
        /// The moved piece at its new position.
        piece: PieceRecord,
        /// Id of the removed piece.
        captured: PieceId,
    },
    /// No piece stands on the source square; nothing changed.
    SourceMissing,
    /// Source and destination are equal; nothing changed.
    Unchanged,
}

/// Registries of every open session, keyed by database path and session id.
///
/// Entries are weak so a registry dies with the last handle of its session.
static REGISTRIES: Mutex<BTreeMap<(String, String), Weak<Mutex<SubscriberRegistry>>>> =
    Mutex::new(BTreeMap::new());

fn shared_registry(db_path: &str, session_id: &str) -> Arc<Mutex<SubscriberRegistry>> {
    let mut registries = REGISTRIES.lock();
    registries.retain(|_, registry| registry.strong_count() > 0);
    let db_path = std::fs::canonicalize(db_path)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| db_path.to_string());
    let key = (db_path, session_id.to_string());
    if let Some(registry) = registries.get(&key).and_then(Weak::upgrade) {
        return registry;
    }
    let registry = Arc::new(Mutex::new(SubscriberRegistry::default()));
    registries.insert(key, Arc::downgrade(&registry));
    registry
}

#[derive(Debug, Default)]
struct SubscriberRegistry {
    next_id: u64,
    senders: BTreeMap<u64, UnboundedSender<Notification>>,
}

impl SubscriberRegistry {
    fn insert(&mut self, sender: UnboundedSender<Notification>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.senders.insert(id, sender);
        id
    }

    fn dispatch(&mut self, changes: &ChangeSet) {
        // Closed receivers are pruned on the way.
        self.senders
            .retain(|_, sender| sender.send(Notification::Changed(changes.clone())).is_ok());
        debug!(subscribers = self.senders.len(), "Change set dispatched");
    }
}

/// Persisted piece collection of one game session.
///
/// Every handle on the same database file and session id shares one
/// subscriber registry, whether it was cloned or opened separately. Every
/// mutation runs in one database
/// transaction and is dispatched to subscribers while the registry lock is
/// held, so subscribers see batches in commit order and never a partial move.
#[derive(Debug, Clone)]
pub struct BoardStore {
    repository: Repository,
    session_id: String,
    subscribers: Arc<Mutex<SubscriberRegistry>>,
}

impl BoardStore {
    /// Opens the store of `session_id` on top of a migrated repository.
    #[instrument(skip(repository))]
    pub fn open(repository: Repository, session_id: String) -> Self {
        info!(session_id = %session_id, "Opening board store");
        let subscribers = shared_registry(repository.db_path(), &session_id);
        Self {
            repository,
            session_id,
            subscribers,
        }
    }

    /// Session this store is keyed by.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// All live records, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] on storage failure or an undecodable row.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn records(&self) -> Result<Vec<PieceRecord>, BoardError> {
        self.repository
            .list_pieces(&self.session_id)?
            .into_iter()
            .map(PieceRecord::try_from)
            .collect()
    }

    /// The record at `position`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] on storage failure or an undecodable row.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn record_at(&self, position: PositionValue) -> Result<Option<PieceRecord>, BoardError> {
        self.repository.transaction(|txn| -> Result<Option<PieceRecord>, BoardError> {
            txn.find_at(&self.session_id, position.x(), position.y(), position.z())?
                .map(PieceRecord::try_from)
                .transpose()
        })
    }

    /// Replaces the session's records with the 32 pieces of a new game.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] if the transaction fails; nothing is changed then.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn initialize_standard_setup(&self) -> Result<ChangeSet, BoardError> {
        let mut registry = self.subscribers.lock();

        let changes = self.repository.transaction(|txn| -> Result<ChangeSet, BoardError> {
            let deleted = txn
                .clear_session(&self.session_id)?
                .into_iter()
                .map(PieceId::new)
                .collect();
            let inserted = standard_layout()
                .into_iter()
                .map(|(kind, position)| {
                    let row = txn.insert(&PieceRecord::new_row(&self.session_id, kind, position))?;
                    PieceRecord::try_from(row)
                })
                .collect::<Result<Vec<_>, BoardError>>()?;
            Ok(ChangeSet::new(inserted, Vec::new(), deleted))
        })?;

        info!(
            inserted = changes.inserted().len(),
            cleared = changes.deleted().len(),
            "Standard setup written"
        );
        registry.dispatch(&changes);
        Ok(changes)
    }

    /// Moves the piece at `from` to `to`, capturing whatever stands on `to`.
    ///
    /// A missing source piece is not an error: the store is left untouched and
    /// [`MoveOutcome::SourceMissing`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] if the transaction fails; nothing is changed then.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn apply_move(
        &self,
        from: PositionValue,
        to: PositionValue,
    ) -> Result<MoveOutcome, BoardError> {
        if from == to {
            warn!("Move onto its own square ignored");
            return Ok(MoveOutcome::Unchanged);
        }

        let mut registry = self.subscribers.lock();

        let (outcome, changes) =
            self.repository.transaction(|txn| -> Result<(MoveOutcome, ChangeSet), BoardError> {
                let source = txn.find_at(&self.session_id, from.x(), from.y(), from.z())?;
                let Some(mover) = source else {
                    return Ok((MoveOutcome::SourceMissing, ChangeSet::default()));
                };

                let captured = txn
                    .find_at(&self.session_id, to.x(), to.y(), to.z())?
                    .map(|row| *row.id());
                if let Some(id) = captured {
                    txn.delete(id)?;
                }

                let moved_row = txn.set_position(*mover.id(), to.x(), to.y(), to.z())?;
                let moved = PieceRecord::try_from(moved_row)?;
                let deleted: Vec<PieceId> = captured.map(PieceId::new).into_iter().collect();
                let outcome = match captured {
                    Some(id) => MoveOutcome::Captured {
                        piece: moved.clone(),
                        captured: PieceId::new(id),
                    },
                    None => MoveOutcome::Moved {
                        piece: moved.clone(),
                    },
                };
                Ok((outcome, ChangeSet::new(Vec::new(), vec![moved], deleted)))
            })?;

        match &outcome {
            MoveOutcome::SourceMissing => warn!("No piece on source square, move ignored"),
            MoveOutcome::Captured { piece, captured } => {
                info!(piece = %piece.id(), captured = %captured, "Piece captured")
            }
            MoveOutcome::Moved { piece } => info!(piece = %piece.id(), "Piece moved"),
            MoveOutcome::Unchanged => {}
        }

        if !changes.is_empty() {
            registry.dispatch(&changes);
        }
        Ok(outcome)
    }

    /// Deletes every record of the session.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] if the transaction fails.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn teardown(&self) -> Result<ChangeSet, BoardError> {
        let mut registry = self.subscribers.lock();
        let deleted = self.repository.transaction(|txn| -> Result<Vec<PieceId>, BoardError> {
            Ok(txn
                .clear_session(&self.session_id)?
                .into_iter()
                .map(PieceId::new)
                .collect())
        })?;
        let changes = ChangeSet::new(Vec::new(), Vec::new(), deleted);
        info!(deleted = changes.deleted().len(), "Session torn down");
        if !changes.is_empty() {
            registry.dispatch(&changes);
        }
        Ok(changes)
    }

    /// Registers a subscriber.
    ///
    /// The first message is always one [`Notification::Initial`] with the
    /// current records (or [`Notification::Error`] if they cannot be read),
    /// followed by one [`Notification::Changed`] per committed transaction.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut registry = self.subscribers.lock();

        let initial = match self.records() {
            Ok(records) => Notification::Initial(records),
            Err(e) => {
                warn!(error = %e, "Initial query failed");
                Notification::Error(e)
            }
        };
        // The receiver is alive, the send cannot fail.
        let _ = sender.send(initial);

        let id = registry.insert(sender);
        debug!(subscription = id, "Subscriber registered");
        Subscription {
            token: SubscriptionToken {
                id,
                registry: Arc::downgrade(&self.subscribers),
            },
            receiver,
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().senders.len()
    }
}

/// Handle that keeps a subscription registered until dropped.
#[derive(Debug)]
pub struct SubscriptionToken {
    id: u64,
    registry: Weak<Mutex<SubscriberRegistry>>,
}

impl SubscriptionToken {
    /// Unregisters the subscription now.
    pub fn unsubscribe(self) {}
}

impl Drop for SubscriptionToken {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().senders.remove(&self.id);
            debug!(subscription = self.id, "Subscriber removed");
        }
    }
}

/// Receiving end of a store subscription.
#[derive(Debug)]
pub struct Subscription {
    token: SubscriptionToken,
    receiver: UnboundedReceiver<Notification>,
}

impl Subscription {
    /// Next queued notification, without waiting.
    pub fn try_next(&mut self) -> Option<Notification> {
        match self.receiver.try_recv() {
            Ok(notification) => Some(notification),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Waits for the next notification.
    pub async fn next(&mut self) -> Option<Notification> {
        self.receiver.recv().await
    }

    /// Splits into the registration token and the raw receiver.
    pub fn into_parts(self) -> (SubscriptionToken, UnboundedReceiver<Notification>) {
        (self.token, self.receiver)
    }
}
