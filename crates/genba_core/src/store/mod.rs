//! Document store contracts and the SQLite-backed implementation.
//!
//! # Responsibility
//! - Persist JSON documents keyed by `(collection, doc_id)`.
//! - Commit multi-document `WriteBatch`es atomically.
//! - Deliver full-collection snapshots to subscribers after every commit.
//!
//! # Invariants
//! - A batch is applied entirely or not at all.
//! - Subscribers only ever observe committed state, at batch granularity.
//! - Every commit bumps the store-wide `version`; every written document
//!   bumps its own `revision`.

use crate::db::DbError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod batch;
pub mod snapshot;
pub mod sqlite_store;
pub mod subscription;

pub use batch::{BatchEntry, WriteBatch, WriteOp};
pub use snapshot::{CollectionSnapshot, Snapshot, SnapshotEntry, StoredDocument};
pub use sqlite_store::SqliteDocumentStore;
pub use subscription::{LiveCollection, SnapshotListener, Subscription};

/// Per-document write counter used for optimistic concurrency checks.
pub type Revision = i64;
/// Store-wide commit counter carried by every snapshot.
pub type StoreVersion = i64;

pub type StoreResult<T> = Result<T, StoreError>;

/// Named collections held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Projects,
    Shain,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Projects, Collection::Shain];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Shain => "shain",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record type that lives in exactly one collection.
pub trait Document: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    /// Key of this record inside its collection.
    fn doc_id(&self) -> &str;
}

impl Document for crate::model::employee::Employee {
    const COLLECTION: Collection = Collection::Shain;

    fn doc_id(&self) -> &str {
        self.id()
    }
}

impl Document for crate::model::project::Project {
    const COLLECTION: Collection = Collection::Projects;

    fn doc_id(&self) -> &str {
        self.id.as_str()
    }
}

/// Store-level failure.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Json(serde_json::Error),
    /// `Create` targeted an existing document.
    AlreadyExists { collection: Collection, doc_id: String },
    /// `Update` targeted a missing document.
    Missing { collection: Collection, doc_id: String },
    /// `Update` precondition failed: the document changed since it was read.
    RevisionConflict {
        collection: Collection,
        doc_id: String,
        expected: Revision,
        actual: Revision,
    },
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "document codec error: {err}"),
            Self::AlreadyExists { collection, doc_id } => {
                write!(f, "document already exists: {collection}/{doc_id}")
            }
            Self::Missing { collection, doc_id } => {
                write!(f, "document not found: {collection}/{doc_id}")
            }
            Self::RevisionConflict {
                collection,
                doc_id,
                expected,
                actual,
            } => write!(
                f,
                "document {collection}/{doc_id} is at revision {actual}, expected {expected}"
            ),
            Self::InvalidData(message) => write!(f, "invalid stored document: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Document store interface consumed by services.
///
/// Mirrors the remote document database surface: live subscriptions plus
/// atomic batched writes. Single-document writes are one-entry batches.
pub trait DocumentStore {
    /// Loads the full current snapshot of one collection.
    fn snapshot(&self, collection: Collection) -> StoreResult<CollectionSnapshot>;

    /// Loads one document by key.
    fn get(&self, collection: Collection, doc_id: &str) -> StoreResult<Option<StoredDocument>>;

    /// Returns whether the collection currently holds no document.
    fn is_empty(&self, collection: Collection) -> StoreResult<bool>;

    /// Applies every entry of `batch` atomically and returns the new version.
    ///
    /// Subscribers of touched collections receive a fresh snapshot after the
    /// commit succeeds. An empty batch is a no-op returning the current
    /// version.
    fn commit(&self, batch: &WriteBatch) -> StoreResult<StoreVersion>;

    /// Registers `listener` for `collection`.
    ///
    /// The listener receives the current snapshot before this call returns,
    /// then one snapshot per committed batch touching the collection, until
    /// the returned guard is dropped.
    fn subscribe(
        &self,
        collection: Collection,
        listener: SnapshotListener,
    ) -> StoreResult<Subscription>;
}
