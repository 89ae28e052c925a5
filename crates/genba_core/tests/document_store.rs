use genba_core::db::open_db_in_memory;
use genba_core::store::{
    CollectionSnapshot, LiveCollection, SnapshotListener, WriteBatch,
};
use genba_core::{Collection, DocumentStore, Employee, SqliteDocumentStore, StoreError};
use std::sync::{Arc, Mutex};

fn employee(number: &str, family_name: &str) -> Employee {
    Employee {
        employee_number: number.to_string(),
        family_name: family_name.to_string(),
        given_name: "太郎".to_string(),
        office: "山口支店".to_string(),
        department: "工事部".to_string(),
        email: String::new(),
    }
}

fn recording_listener() -> (SnapshotListener, Arc<Mutex<Vec<CollectionSnapshot>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let listener: SnapshotListener = Box::new(move |snapshot: &CollectionSnapshot| {
        sink.lock().unwrap().push(snapshot.clone());
    });
    (listener, seen)
}

#[test]
fn failing_entry_rolls_back_the_whole_batch() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let mut seed = WriteBatch::new();
    seed.create(&employee("001", "山田")).unwrap();
    let version = store.commit(&seed).unwrap();

    let mut batch = WriteBatch::new();
    batch.create(&employee("002", "佐藤")).unwrap();
    batch.create(&employee("001", "上書き")).unwrap();
    let err = store.commit(&batch).unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { ref doc_id, .. } if doc_id == "001"));

    let snapshot = store.snapshot(Collection::Shain).unwrap();
    assert_eq!(snapshot.version, version);
    assert_eq!(snapshot.documents.len(), 1);
    assert_eq!(snapshot.documents[0].body["姓"], "山田");
}

#[test]
fn update_of_missing_document_fails() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let mut batch = WriteBatch::new();
    batch
        .update(
            Collection::Projects,
            "K-404",
            &serde_json::json!({ "name": "x" }),
            None,
        )
        .unwrap();
    assert!(matches!(
        store.commit(&batch),
        Err(StoreError::Missing { .. })
    ));
    assert!(store.is_empty(Collection::Projects).unwrap());
}

#[test]
fn subscription_gets_initial_and_post_commit_snapshots_until_dropped() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let (listener, seen) = recording_listener();

    let subscription = store.subscribe(Collection::Shain, listener).unwrap();
    assert_eq!(subscription.collection(), Collection::Shain);
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert!(seen.lock().unwrap()[0].documents.is_empty());

    let mut batch = WriteBatch::new();
    batch.create(&employee("001", "山田")).unwrap();
    batch.create(&employee("002", "佐藤")).unwrap();
    let version = store.commit(&batch).unwrap();
    {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2, "one delivery per batch");
        assert_eq!(seen[1].version, version);
        assert_eq!(seen[1].documents.len(), 2);
    }

    let mut other_collection = WriteBatch::new();
    other_collection.delete(Collection::Projects, "K-1");
    store.commit(&other_collection).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 2);

    drop(subscription);
    let mut batch = WriteBatch::new();
    batch.delete(Collection::Shain, "001");
    store.commit(&batch).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn live_collection_tracks_commits_and_revisions() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let live = LiveCollection::<Employee>::attach(&store).unwrap();
    assert!(live.latest().is_empty());

    let mut batch = WriteBatch::new();
    batch.set(&employee("001", "山田")).unwrap();
    store.commit(&batch).unwrap();
    let first = live.latest();
    assert_eq!(first.entry("001").unwrap().revision, 1);

    let mut batch = WriteBatch::new();
    batch.set(&employee("001", "山本")).unwrap();
    let version = store.commit(&batch).unwrap();
    let second = live.latest();
    assert_eq!(live.version(), version);
    assert_eq!(second.entry("001").unwrap().revision, 2);
    assert_eq!(second.get("001").unwrap().family_name, "山本");
    assert_eq!(first.get("001").unwrap().family_name, "山田");
}
