use std::sync::Arc;

use doc_store::{DocStore, Filter, FindOptions, SqliteDocStore, StoreError, Update};
use parking_lot::Mutex;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Note {
    title: String,
}

fn note(title: &str) -> Note {
    Note {
        title: title.to_string(),
    }
}

#[test]
fn sqlite_store_roundtrip() {
    let store: SqliteDocStore<Note> = SqliteDocStore::open(":memory:", "notes").expect("store");
    let id = store.create_one(note("a")).expect("create");

    let doc = store
        .read_one(&Filter::by_id(id), FindOptions::default())
        .expect("read")
        .expect("doc");
    assert_eq!(doc.fields.title, "a");

    let updated = store
        .update_one(&Filter::by_id(id), &Update::new().set("title", "a2"))
        .expect("update");
    assert!(updated);

    assert!(store.delete_one(&Filter::by_id(id)).expect("delete"));
    assert!(!store.delete_one(&Filter::by_id(id)).expect("delete"));
}

#[test]
fn sqlite_store_rejects_protected_fields() {
    let store: SqliteDocStore<Note> = SqliteDocStore::open(":memory:", "notes").expect("store");
    let id = store.create_one(note("a")).expect("create");
    let err = store
        .update_one(&Filter::by_id(id), &Update::new().set("id", "forged"))
        .expect_err("protected");
    assert!(matches!(err, StoreError::ProtectedField(_)));
}

#[test]
fn collections_are_isolated_on_a_shared_connection() {
    let conn = Arc::new(Mutex::new(Connection::open(":memory:").expect("conn")));
    let notes: SqliteDocStore<Note> =
        SqliteDocStore::with_connection(conn.clone(), "notes").expect("store");
    let drafts: SqliteDocStore<Note> =
        SqliteDocStore::with_connection(conn, "drafts").expect("store");

    notes.create_one(note("a")).expect("create");

    let in_notes = notes
        .read_many(&Filter::all(), FindOptions::default())
        .expect("read");
    assert_eq!(in_notes.len(), 1);
    let in_drafts = drafts
        .read_many(&Filter::all(), FindOptions::default())
        .expect("read");
    assert!(in_drafts.is_empty());
}
