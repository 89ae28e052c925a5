//! SQLite implementation of `DocumentStore`.
//!
//! # Invariants
//! - `commit` runs inside one `IMMEDIATE` transaction; any failing entry
//!   rolls back the whole batch.
//! - Snapshots are read and delivered only after the transaction commits.
//! - Documents are listed in `doc_id ASC` order.

use crate::store::subscription::SnapshotHub;
use crate::store::{
    BatchEntry, Collection, CollectionSnapshot, DocumentStore, Revision, SnapshotListener,
    StoreError, StoreResult, StoreVersion, StoredDocument, Subscription, WriteBatch, WriteOp,
};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

/// Document store over a migrated SQLite connection.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
    hub: Arc<SnapshotHub>,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Constructs a store from a connection returned by `open_db*`.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_tables(conn)?;
        Ok(Self {
            conn,
            hub: Arc::new(SnapshotHub::default()),
        })
    }

    fn current_version(&self) -> StoreResult<StoreVersion> {
        read_version(self.conn)
    }

    fn load_snapshot(&self, collection: Collection) -> StoreResult<CollectionSnapshot> {
        let version = self.current_version()?;
        let mut stmt = self.conn.prepare(
            "SELECT doc_id, revision, body
             FROM documents
             WHERE collection = ?1
             ORDER BY doc_id ASC;",
        )?;
        let mut rows = stmt.query([collection.as_str()])?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(row, collection)?);
        }
        Ok(CollectionSnapshot {
            collection,
            version,
            documents,
        })
    }

    fn publish(&self, touched: &BTreeSet<Collection>) {
        for &collection in touched {
            if !self.hub.has_listeners(collection) {
                continue;
            }
            match self.load_snapshot(collection) {
                Ok(snapshot) => self.hub.deliver(&snapshot),
                Err(err) => error!(
                    "event=snapshot_publish module=store status=error collection={collection} error={err}"
                ),
            }
        }
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn snapshot(&self, collection: Collection) -> StoreResult<CollectionSnapshot> {
        self.load_snapshot(collection)
    }

    fn get(&self, collection: Collection, doc_id: &str) -> StoreResult<Option<StoredDocument>> {
        self.conn
            .query_row(
                "SELECT doc_id, revision, body
                 FROM documents
                 WHERE collection = ?1 AND doc_id = ?2;",
                params![collection.as_str(), doc_id],
                |row| Ok(parse_document_row(row, collection)),
            )
            .optional()?
            .transpose()
    }

    fn is_empty(&self, collection: Collection) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM documents WHERE collection = ?1);",
            [collection.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists == 0)
    }

    fn commit(&self, batch: &WriteBatch) -> StoreResult<StoreVersion> {
        if batch.is_empty() {
            return self.current_version();
        }

        let started_at = Instant::now();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut touched = BTreeSet::new();
        for entry in batch.entries() {
            if let Err(err) = apply_entry(&tx, entry) {
                error!(
                    "event=batch_commit module=store status=error ops={} failed_op={} target={}/{} duration_ms={} error={err}",
                    batch.len(),
                    entry.op.kind(),
                    entry.collection,
                    entry.doc_id,
                    started_at.elapsed().as_millis()
                );
                // Dropping `tx` rolls the batch back.
                return Err(err);
            }
            touched.insert(entry.collection);
        }
        tx.execute(
            "UPDATE store_version SET version = version + 1 WHERE id = 1;",
            [],
        )?;
        let version = read_version(&tx)?;
        tx.commit()?;

        info!(
            "event=batch_commit module=store status=ok ops={} version={version} duration_ms={}",
            batch.len(),
            started_at.elapsed().as_millis()
        );
        self.publish(&touched);
        Ok(version)
    }

    fn subscribe(
        &self,
        collection: Collection,
        mut listener: SnapshotListener,
    ) -> StoreResult<Subscription> {
        let initial = self.load_snapshot(collection)?;
        listener(&initial);
        Ok(self.hub.register(collection, listener))
    }
}

fn apply_entry(tx: &Transaction<'_>, entry: &BatchEntry) -> StoreResult<()> {
    let collection = entry.collection.as_str();
    let doc_id = entry.doc_id.as_str();
    if doc_id.trim().is_empty() {
        return Err(StoreError::InvalidData(format!(
            "blank document id in {collection}"
        )));
    }

    match &entry.op {
        WriteOp::Create(body) => {
            if load_revision(tx, entry.collection, doc_id)?.is_some() {
                return Err(StoreError::AlreadyExists {
                    collection: entry.collection,
                    doc_id: entry.doc_id.clone(),
                });
            }
            tx.execute(
                "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3);",
                params![collection, doc_id, body.to_string()],
            )?;
        }
        WriteOp::Set(body) => {
            tx.execute(
                "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3)
                 ON CONFLICT (collection, doc_id) DO UPDATE SET
                    body = excluded.body,
                    revision = documents.revision + 1,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![collection, doc_id, body.to_string()],
            )?;
        }
        WriteOp::Update {
            fields,
            expected_revision,
        } => {
            let (revision, body_text): (Revision, String) = tx
                .query_row(
                    "SELECT revision, body FROM documents WHERE collection = ?1 AND doc_id = ?2;",
                    params![collection, doc_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?
                .ok_or_else(|| StoreError::Missing {
                    collection: entry.collection,
                    doc_id: entry.doc_id.clone(),
                })?;

            if let Some(expected) = *expected_revision {
                if expected != revision {
                    return Err(StoreError::RevisionConflict {
                        collection: entry.collection,
                        doc_id: entry.doc_id.clone(),
                        expected,
                        actual: revision,
                    });
                }
            }

            let mut body = match serde_json::from_str::<Value>(&body_text)? {
                Value::Object(map) => map,
                _ => {
                    return Err(StoreError::InvalidData(format!(
                        "document {collection}/{doc_id} is not a JSON object"
                    )));
                }
            };
            for (key, value) in fields {
                body.insert(key.clone(), value.clone());
            }
            tx.execute(
                "UPDATE documents
                 SET
                    body = ?3,
                    revision = revision + 1,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE collection = ?1 AND doc_id = ?2;",
                params![collection, doc_id, Value::Object(body).to_string()],
            )?;
        }
        WriteOp::Delete => {
            tx.execute(
                "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2;",
                params![collection, doc_id],
            )?;
        }
    }
    Ok(())
}

fn load_revision(
    conn: &Connection,
    collection: Collection,
    doc_id: &str,
) -> StoreResult<Option<Revision>> {
    let revision = conn
        .query_row(
            "SELECT revision FROM documents WHERE collection = ?1 AND doc_id = ?2;",
            params![collection.as_str(), doc_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(revision)
}

fn read_version(conn: &Connection) -> StoreResult<StoreVersion> {
    let version = conn.query_row(
        "SELECT version FROM store_version WHERE id = 1;",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn parse_document_row(row: &Row<'_>, collection: Collection) -> StoreResult<StoredDocument> {
    let doc_id: String = row.get("doc_id")?;
    let body_text: String = row.get("body")?;
    let body = serde_json::from_str(&body_text).map_err(|err| {
        StoreError::InvalidData(format!(
            "document {collection}/{doc_id} has unreadable body: {err}"
        ))
    })?;
    Ok(StoredDocument {
        doc_id,
        revision: row.get("revision")?,
        body,
    })
}

fn ensure_store_tables(conn: &Connection) -> StoreResult<()> {
    for table in ["documents", "store_version"] {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(StoreError::InvalidData(format!(
                "table `{table}` is missing; open the database with open_db first"
            )));
        }
    }
    Ok(())
}
