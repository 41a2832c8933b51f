//! Integration tests: file-backed document store and editor sessions.

use am_core::id::NodeId;
use am_core::model::Position;
use am_editor::session::EditorSession;
use am_editor::store::{DocumentStore, FileStore, StoreError, UserId};
use am_editor::sync::{EditEvent, SyncConfig};
use pretty_assertions::assert_eq;

#[test]
fn missing_document_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    assert_eq!(store.load(&UserId::from("nobody")).unwrap(), "");
}

#[test]
fn save_then_load_round_trips_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path().join("maps"));
    let user = UserId::from("carol");
    let text = "10,20,A\r\nB\r\nA -} B\r\n";

    store.save(&user, text).unwrap();
    assert_eq!(store.load(&user).unwrap(), text);
    assert!(dir.path().join("maps/carol.am").is_file());
    assert!(!dir.path().join("maps/carol.am.tmp").exists());
}

#[test]
fn invalid_user_never_touches_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    let err = store.save(&UserId::from("../escape"), "A").unwrap_err();
    assert!(matches!(err, StoreError::InvalidUser(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn session_edits_persist_across_opens() {
    let dir = tempfile::tempdir().unwrap();
    let user = UserId::from("dave");
    let mut seed = FileStore::new(dir.path());
    seed.save(&user, "0,0,A\nB\nA -> B\n").unwrap();

    let (mut session, err) =
        EditorSession::open(FileStore::new(dir.path()), user.clone(), SyncConfig::default());
    assert!(err.is_none());

    session.begin_batch();
    for step in 1..=3 {
        session
            .apply(
                EditEvent::MoveNode {
                    id: NodeId::intern("A"),
                    to: Position::new(step * 10, 0),
                },
                "Drag",
            )
            .unwrap();
    }
    session.end_batch("Move A");
    assert!(session.save_if_dirty().unwrap());

    let (reopened, _) = EditorSession::open(FileStore::new(dir.path()), user, SyncConfig::default());
    assert_eq!(reopened.text(), "30,0,A\nB\nA -> B\n");
    assert_eq!(
        reopened.sync().graph().node_by_label("A").map(|n| n.position),
        Some(Position::new(30, 0))
    );
}

#[test]
fn unreadable_document_opens_empty_session() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be makes the read fail.
    std::fs::create_dir(dir.path().join("erin.am")).unwrap();

    let (session, err) = EditorSession::open(
        FileStore::new(dir.path()),
        UserId::from("erin"),
        SyncConfig::default(),
    );
    assert!(matches!(err, Some(StoreError::Io(_))));
    assert_eq!(session.text(), "");
    assert_eq!(session.sync().graph().node_count(), 0);
}
