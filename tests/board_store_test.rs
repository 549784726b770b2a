//! Tests for the persisted board store and its subscriptions.

use std::collections::HashSet;

use board_keeper::{
    BoardStore, DbError, MoveOutcome, Notification, PieceKind, PositionValue, Repository,
    standard_layout,
};
use tempfile::TempDir;

/// Creates a migrated database in a temp dir and opens `session` on it. The
/// directory handle must stay in scope to keep the file alive.
fn setup_store(session: &str) -> (TempDir, BoardStore) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let repo = repository(&dir);
    (dir, BoardStore::open(repo, session.to_string()))
}

fn repository(dir: &TempDir) -> Repository {
    let db_path = dir
        .path()
        .join("board.db")
        .to_str()
        .expect("Invalid path")
        .to_string();
    let repo = Repository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    repo
}

/// The opening position, written out square by square.
fn opening_table() -> Vec<(PieceKind, &'static str)> {
    use PieceKind::*;
    vec![
        (WhiteRook, "a1"),
        (WhiteKnight, "b1"),
        (WhiteBishop, "c1"),
        (WhiteQueen, "d1"),
        (WhiteKing, "e1"),
        (WhiteBishop, "f1"),
        (WhiteKnight, "g1"),
        (WhiteRook, "h1"),
        (WhitePawn, "a2"),
        (WhitePawn, "b2"),
        (WhitePawn, "c2"),
        (WhitePawn, "d2"),
        (WhitePawn, "e2"),
        (WhitePawn, "f2"),
        (WhitePawn, "g2"),
        (WhitePawn, "h2"),
        (BlackPawn, "a7"),
        (BlackPawn, "b7"),
        (BlackPawn, "c7"),
        (BlackPawn, "d7"),
        (BlackPawn, "e7"),
        (BlackPawn, "f7"),
        (BlackPawn, "g7"),
        (BlackPawn, "h7"),
        (BlackRook, "a8"),
        (BlackKnight, "b8"),
        (BlackBishop, "c8"),
        (BlackQueen, "d8"),
        (BlackKing, "e8"),
        (BlackBishop, "f8"),
        (BlackKnight, "g8"),
        (BlackRook, "h8"),
    ]
}

fn square(name: &str) -> PositionValue {
    PositionValue::from_square_name(name).expect("Invalid square")
}

#[test]
fn test_standard_setup_has_all_canonical_pieces() {
    let (_dir, store) = setup_store("game");
    let changes = store.initialize_standard_setup().expect("Setup failed");
    assert_eq!(changes.inserted().len(), 32);
    assert!(changes.deleted().is_empty());

    let records = store.records().expect("Query failed");
    assert_eq!(records.len(), 32);

    let ids: HashSet<_> = records.iter().map(|r| *r.id()).collect();
    assert_eq!(ids.len(), 32, "Ids must be unique");

    let expected = opening_table();
    assert_eq!(expected.len(), 32);
    for (kind, name) in expected {
        let position = square(name);
        assert!(
            records
                .iter()
                .any(|r| *r.kind() == kind && *r.position() == position),
            "Missing {} at {}",
            kind,
            name
        );
    }
}

#[test]
fn test_standard_layout_matches_opening_table() {
    let mut layout: Vec<(PieceKind, String)> = standard_layout()
        .into_iter()
        .map(|(kind, p)| (kind, p.square_name().expect("Off board")))
        .collect();
    let mut expected: Vec<(PieceKind, String)> = opening_table()
        .into_iter()
        .map(|(kind, name)| (kind, name.to_string()))
        .collect();
    layout.sort_by(|a, b| a.1.cmp(&b.1));
    expected.sort_by(|a, b| a.1.cmp(&b.1));
    assert_eq!(layout, expected);
}

#[test]
fn test_standard_setup_replaces_existing_pieces() {
    let (_dir, store) = setup_store("game");
    let first = store.initialize_standard_setup().expect("Setup failed");
    store
        .apply_move(square("e2"), square("e4"))
        .expect("Move failed");

    let second = store.initialize_standard_setup().expect("Setup failed");
    assert_eq!(second.deleted().len(), 32);
    assert_eq!(second.inserted().len(), 32);
    assert_eq!(store.records().expect("Query failed").len(), 32);

    let old_ids: HashSet<_> = first.inserted_ids().into_iter().collect();
    assert!(second.inserted_ids().iter().all(|id| !old_ids.contains(id)));
    assert!(store.record_at(square("e4")).expect("Query failed").is_none());
}

#[test]
fn test_quiet_move_keeps_identity() {
    let (_dir, store) = setup_store("game");
    store.initialize_standard_setup().expect("Setup failed");
    let pawn = store
        .record_at(square("e2"))
        .expect("Query failed")
        .expect("No pawn on e2");

    let outcome = store
        .apply_move(square("e2"), square("e4"))
        .expect("Move failed");
    assert!(matches!(outcome, MoveOutcome::Moved { .. }));

    assert!(store.record_at(square("e2")).expect("Query failed").is_none());
    let moved = store
        .record_at(square("e4"))
        .expect("Query failed")
        .expect("No piece on e4");
    assert_eq!(moved.id(), pawn.id());
    assert_eq!(*moved.kind(), PieceKind::WhitePawn);
    assert_eq!(store.records().expect("Query failed").len(), 32);
}

#[test]
fn test_capture_removes_occupant() {
    let (_dir, store) = setup_store("game");
    store.initialize_standard_setup().expect("Setup failed");
    let queen = store
        .record_at(square("d1"))
        .expect("Query failed")
        .expect("No queen on d1");
    let victim = store
        .record_at(square("d7"))
        .expect("Query failed")
        .expect("No pawn on d7");

    let outcome = store
        .apply_move(square("d1"), square("d7"))
        .expect("Move failed");
    match outcome {
        MoveOutcome::Captured { piece, captured } => {
            assert_eq!(piece.id(), queen.id());
            assert_eq!(captured, *victim.id());
        }
        other => panic!("Expected capture, got {:?}", other),
    }

    let records = store.records().expect("Query failed");
    assert_eq!(records.len(), 31);
    assert!(records.iter().all(|r| r.id() != victim.id()));
    let at_target = store
        .record_at(square("d7"))
        .expect("Query failed")
        .expect("No piece on d7");
    assert_eq!(at_target.id(), queen.id());
    assert_eq!(*at_target.kind(), PieceKind::WhiteQueen);
}

#[test]
fn test_move_from_empty_square_changes_nothing() {
    let (_dir, store) = setup_store("game");
    store.initialize_standard_setup().expect("Setup failed");
    let before = store.records().expect("Query failed");
    let mut subscription = store.subscribe();
    subscription.try_next().expect("Missing initial notification");

    let outcome = store
        .apply_move(square("e4"), square("e5"))
        .expect("Move failed");
    assert_eq!(outcome, MoveOutcome::SourceMissing);
    assert_eq!(store.records().expect("Query failed"), before);
    assert!(subscription.try_next().is_none(), "No batch expected");
}

#[test]
fn test_move_onto_own_square_changes_nothing() {
    let (_dir, store) = setup_store("game");
    store.initialize_standard_setup().expect("Setup failed");
    let before = store.records().expect("Query failed");

    let outcome = store
        .apply_move(square("e2"), square("e2"))
        .expect("Move failed");
    assert_eq!(outcome, MoveOutcome::Unchanged);
    assert_eq!(store.records().expect("Query failed"), before);
}

#[test]
fn test_subscribe_to_empty_store_delivers_empty_initial() {
    let (_dir, store) = setup_store("game");
    let mut subscription = store.subscribe();

    match subscription.try_next() {
        Some(Notification::Initial(records)) => assert!(records.is_empty()),
        other => panic!("Expected empty initial, got {:?}", other),
    }
    assert!(subscription.try_next().is_none());
}

#[test]
fn test_subscribe_to_populated_store_delivers_snapshot_only() {
    let (_dir, store) = setup_store("game");
    store.initialize_standard_setup().expect("Setup failed");
    let mut subscription = store.subscribe();

    match subscription.try_next() {
        Some(Notification::Initial(records)) => assert_eq!(records.len(), 32),
        other => panic!("Expected initial snapshot, got {:?}", other),
    }
    assert!(subscription.try_next().is_none(), "No insert batch expected");
}

#[test]
fn test_move_notification_carries_update_and_deletion() {
    let (_dir, store) = setup_store("game");
    store.initialize_standard_setup().expect("Setup failed");
    let mut subscription = store.subscribe();
    subscription.try_next().expect("Missing initial notification");

    store
        .apply_move(square("d1"), square("d7"))
        .expect("Move failed");

    match subscription.try_next() {
        Some(Notification::Changed(changes)) => {
            assert!(changes.inserted().is_empty());
            assert_eq!(changes.updated().len(), 1);
            assert_eq!(*changes.updated()[0].position(), square("d7"));
            assert_eq!(changes.deleted().len(), 1);
        }
        other => panic!("Expected change set, got {:?}", other),
    }
}

#[test]
fn test_unsubscribed_receiver_gets_nothing_more() {
    let (_dir, store) = setup_store("game");
    let subscription = store.subscribe();
    assert_eq!(store.subscriber_count(), 1);

    let (token, mut receiver) = subscription.into_parts();
    assert!(matches!(receiver.try_recv(), Ok(Notification::Initial(_))));
    token.unsubscribe();
    assert_eq!(store.subscriber_count(), 0);

    store.initialize_standard_setup().expect("Setup failed");
    assert!(receiver.try_recv().is_err());
}

#[test]
fn test_dropped_subscription_is_pruned() {
    let (_dir, store) = setup_store("game");
    let subscription = store.subscribe();
    let other = store.clone().subscribe();
    assert_eq!(store.subscriber_count(), 2);

    drop(subscription);
    assert_eq!(store.subscriber_count(), 1);
    drop(other);
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn test_sessions_are_isolated() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let repo = repository(&dir);
    let first = BoardStore::open(repo.clone(), "first".to_string());
    let second = BoardStore::open(repo, "second".to_string());

    first.initialize_standard_setup().expect("Setup failed");
    assert!(second.records().expect("Query failed").is_empty());

    second.initialize_standard_setup().expect("Setup failed");
    first.teardown().expect("Teardown failed");
    assert!(first.records().expect("Query failed").is_empty());
    assert_eq!(second.records().expect("Query failed").len(), 32);
}

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    {
        let store = BoardStore::open(repository(&dir), "game".to_string());
        store.initialize_standard_setup().expect("Setup failed");
        store
            .apply_move(square("g1"), square("f3"))
            .expect("Move failed");
    }

    let store = BoardStore::open(repository(&dir), "game".to_string());
    let knight = store
        .record_at(square("f3"))
        .expect("Query failed")
        .expect("Knight not persisted");
    assert_eq!(*knight.kind(), PieceKind::WhiteKnight);
    assert_eq!(store.records().expect("Query failed").len(), 32);
}

#[test]
fn test_teardown_reports_deleted_ids() {
    let (_dir, store) = setup_store("game");
    let setup = store.initialize_standard_setup().expect("Setup failed");
    let changes = store.teardown().expect("Teardown failed");

    let mut expected = setup.inserted_ids();
    let mut deleted = changes.deleted().clone();
    expected.sort();
    deleted.sort();
    assert_eq!(deleted, expected);
}

#[test]
fn test_handles_on_same_session_share_notifications() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let repo = repository(&dir);
    let reader = BoardStore::open(repo.clone(), "game".to_string());
    let writer = BoardStore::open(repo, "game".to_string());

    let mut subscription = reader.subscribe();
    subscription.try_next().expect("Missing initial notification");
    assert_eq!(writer.subscriber_count(), 1);

    writer.initialize_standard_setup().expect("Setup failed");
    match subscription.try_next() {
        Some(Notification::Changed(changes)) => assert_eq!(changes.inserted().len(), 32),
        other => panic!("Expected change set from other handle, got {:?}", other),
    }
}

#[test]
fn test_separately_opened_repositories_share_notifications() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let reader = BoardStore::open(repository(&dir), "game".to_string());
    let writer = BoardStore::open(repository(&dir), "game".to_string());
    let other_session = BoardStore::open(repository(&dir), "other".to_string());

    let mut subscription = reader.subscribe();
    subscription.try_next().expect("Missing initial notification");
    let mut other_subscription = other_session.subscribe();
    other_subscription.try_next().expect("Missing initial notification");

    writer.initialize_standard_setup().expect("Setup failed");
    writer
        .apply_move(square("e2"), square("e4"))
        .expect("Move failed");

    assert!(matches!(subscription.try_next(), Some(Notification::Changed(_))));
    match subscription.try_next() {
        Some(Notification::Changed(changes)) => {
            assert_eq!(*changes.updated()[0].position(), square("e4"))
        }
        other => panic!("Expected move batch, got {:?}", other),
    }
    assert!(other_subscription.try_next().is_none(), "Other session must stay quiet");
}

#[test]
fn test_repositioning_missing_row_reports_not_found() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let repo = repository(&dir);
    let err = repo
        .transaction(|txn| -> Result<_, DbError> { txn.set_position(999, 1.0, 0.0, 1.0) })
        .expect_err("Missing row should fail");
    assert!(err.message.contains("Row not found"), "{}", err);
}

#[test]
fn test_repository_rejects_empty_path() {
    assert!(Repository::new("  ".to_string()).is_err());
}
