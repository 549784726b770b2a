//! Tests for the preference and document stores.

use board_keeper::{DocumentStore, PreferenceStore, StorageError};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    text: String,
}

#[test]
fn test_preferences_round_trip_through_disk() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("prefs.toml");

    let mut prefs = PreferenceStore::open(&path).expect("Open failed");
    assert!(!prefs.has_key("count"));
    prefs.set_int("count", 7);
    prefs.set_string("name", "game-1");
    prefs.save().expect("Save failed");

    let reopened = PreferenceStore::open(&path).expect("Reopen failed");
    assert_eq!(reopened.get_int("count"), Some(7));
    assert_eq!(reopened.get_string("name"), Some("game-1"));
    assert_eq!(reopened.get_int("name"), None);
}

#[test]
fn test_unsaved_preferences_are_lost() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("prefs.toml");
    let mut prefs = PreferenceStore::open(&path).expect("Open failed");
    prefs.set_int("count", 1);

    let reopened = PreferenceStore::open(&path).expect("Reopen failed");
    assert!(!reopened.has_key("count"));
}

#[test]
fn test_document_write_persists() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("docs.json");
    let mut store = DocumentStore::open(&path).expect("Open failed");

    store
        .write(|txn| {
            txn.put(
                "notes",
                1,
                &Note {
                    text: "hello".to_string(),
                },
            )
        })
        .expect("Write failed");

    let reopened = DocumentStore::open(&path).expect("Reopen failed");
    let note: Note = reopened
        .find("notes", 1)
        .expect("Find failed")
        .expect("Note missing");
    assert_eq!(note.text, "hello");
    assert_eq!(reopened.count("notes"), 1);
    assert_eq!(reopened.count("other"), 0);
}

#[test]
fn test_failed_document_write_changes_nothing() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("docs.json");
    let mut store = DocumentStore::open(&path).expect("Open failed");

    let result: Result<(), StorageError> = store.write(|txn| {
        txn.put(
            "notes",
            1,
            &Note {
                text: "draft".to_string(),
            },
        )?;
        Err(StorageError::new("abort"))
    });
    assert!(result.is_err());
    assert_eq!(store.count("notes"), 0);
    assert!(!path.exists());
}

#[test]
fn test_document_remove_inside_transaction() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut store = DocumentStore::open(dir.path().join("docs.json")).expect("Open failed");
    store
        .write(|txn| txn.put("notes", 3, &Note { text: "x".to_string() }))
        .expect("Write failed");

    let removed = store
        .write(|txn| {
            let removed = txn.remove("notes", 3);
            assert!(txn.find::<Note>("notes", 3)?.is_none());
            Ok(removed)
        })
        .expect("Write failed");
    assert!(removed);
    assert_eq!(store.count("notes"), 0);
}

#[test]
fn test_stores_on_same_file_keep_each_others_keys() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("prefs.toml");
    let mut first = PreferenceStore::open(&path).expect("Open failed");
    let mut second = PreferenceStore::open(&path).expect("Open failed");

    first.set_int("first", 1);
    first.save().expect("Save failed");
    second.set_string("second", "two");
    second.save().expect("Save failed");
    first.set_int("first", 2);
    first.save().expect("Save failed");

    let reopened = PreferenceStore::open(&path).expect("Reopen failed");
    assert_eq!(reopened.get_int("first"), Some(2));
    assert_eq!(reopened.get_string("second"), Some("two"));
    assert_eq!(first.get_string("second"), Some("two"));
}
