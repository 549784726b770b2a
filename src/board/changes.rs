//! Change batches delivered to store subscribers.

use derive_getters::Getters;
use derive_new::new;

use crate::{BoardError, PieceId, PieceRecord};

/// Everything one committed transaction changed.
#[derive(Debug, Clone, Default, PartialEq, Getters, new)]
pub struct ChangeSet {
    inserted: Vec<PieceRecord>,
    updated: Vec<PieceRecord>,
    deleted: Vec<PieceId>,
}

impl ChangeSet {
    /// True if the transaction changed nothing.
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Ids of the inserted records.
    pub fn inserted_ids(&self) -> Vec<PieceId> {
        self.inserted.iter().map(|r| *r.id()).collect()
    }
}

/// A message on a store subscription.
#[derive(Debug, Clone)]
pub enum Notification {
    /// Full record set at subscription time. Always the first message.
    Initial(Vec<PieceRecord>),
    /// One committed transaction.
    Changed(ChangeSet),
    /// The store failed to produce a notification.
    Error(BoardError),
}
