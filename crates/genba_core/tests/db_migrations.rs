use genba_core::db::migrations::latest_version;
use genba_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_document_tables() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "documents");
    assert_table_exists(&conn, "store_version");
    let version: i64 = conn
        .query_row("SELECT version FROM store_version WHERE id = 1;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(version, 0);
}

#[test]
fn reopening_a_file_keeps_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("genba.sqlite3");

    let conn = open_db(&path).unwrap();
    conn.execute(
        "INSERT INTO documents (collection, doc_id, body) VALUES ('shain', '001', '{}');",
        [],
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM documents;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn schema_rejects_unknown_collections_and_blank_ids() {
    let conn = open_db_in_memory().unwrap();
    assert!(conn
        .execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES ('atoms', 'x', '{}');",
            [],
        )
        .is_err());
    assert!(conn
        .execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES ('projects', '  ', '{}');",
            [],
        )
        .is_err());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reopening_after_store_version_row_was_lost_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("damaged.sqlite3");

    let conn = open_db(&path).unwrap();
    conn.execute("DELETE FROM store_version;", []).unwrap();
    drop(conn);

    assert!(matches!(
        open_db(&path).unwrap_err(),
        DbError::MissingStoreVersion
    ));
}

#[test]
fn failing_migration_names_its_version_and_keeps_schema_unmigrated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foreign.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE store_version (id TEXT);").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::Migration { version, .. } => assert_eq!(version, 1),
        other => panic!("unexpected error: {other}"),
    }
    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 0);
    let documents: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'documents';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(documents, 0);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
