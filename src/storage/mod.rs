//! Small file-backed stores: key-value preferences and JSON documents.

mod documents;
mod error;
mod preferences;

pub use documents::{DocumentStore, DocumentTransaction};
pub use error::StorageError;
pub use preferences::PreferenceStore;
