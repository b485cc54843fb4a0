use doc_store::{DocStore, Filter, FindOptions, SledDocStore, Update};
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

fn temp_store() -> SledDocStore<Note> {
    let db = sled::Config::new().temporary(true).open().expect("db");
    SledDocStore::with_db(db, "notes").expect("store")
}

#[test]
fn sled_store_roundtrip() {
    let store = temp_store();
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
    let doc = store
        .read_one(&Filter::by_id(id), FindOptions::default())
        .expect("read")
        .expect("doc");
    assert_eq!(doc.fields.title, "a2");
    assert!(doc.updated_ms > doc.created_ms);

    assert!(store.delete_one(&Filter::by_id(id)).expect("delete"));
    assert!(store
        .read_one(&Filter::by_id(id), FindOptions::default())
        .expect("read")
        .is_none());
}

#[test]
fn sled_store_sorts_most_recent_first() {
    let store = temp_store();
    let first = store.create_one(note("a")).expect("create");
    store.create_one(note("b")).expect("create");
    store
        .update_one(&Filter::by_id(first), &Update::new().set("title", "a2"))
        .expect("update");

    let top = store
        .read_one(&Filter::all(), FindOptions::default())
        .expect("read")
        .expect("doc");
    assert_eq!(top.fields.title, "a2");
}

#[test]
fn sled_store_create_if_absent() {
    let store = temp_store();
    let filter = Filter::all().eq("title", "a");
    assert!(store
        .create_if_absent(&filter, note("a"))
        .expect("create")
        .is_some());
    assert!(store
        .create_if_absent(&filter, note("a"))
        .expect("create")
        .is_none());
}

#[test]
fn sled_store_persists_across_reopen() {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "doc-store-sled-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ));
    let path = path.to_string_lossy().to_string();

    let id = {
        let store: SledDocStore<Note> = SledDocStore::open(&path, "notes").expect("store");
        store.create_one(note("kept")).expect("create")
    };

    let store: SledDocStore<Note> = SledDocStore::open(&path, "notes").expect("store");
    let doc = store
        .read_one(&Filter::by_id(id), FindOptions::default())
        .expect("read")
        .expect("doc");
    assert_eq!(doc.fields.title, "kept");

    let _ = std::fs::remove_dir_all(&path);
}
