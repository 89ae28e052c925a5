//! Raw and typed collection snapshots.

use crate::store::{Collection, Document, Revision, StoreResult, StoreVersion};
use serde_json::Value;

/// One stored document as read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub doc_id: String,
    pub revision: Revision,
    pub body: Value,
}

/// Full point-in-time copy of one collection, ordered by `doc_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot {
    pub collection: Collection,
    pub version: StoreVersion,
    pub documents: Vec<StoredDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry<T> {
    pub revision: Revision,
    pub record: T,
}

/// Typed view over a `CollectionSnapshot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T> {
    version: StoreVersion,
    entries: Vec<SnapshotEntry<T>>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            version: 0,
            entries: Vec::new(),
        }
    }
}

impl<T: Document> Snapshot<T> {
    /// Decodes every document body into `T`.
    pub fn decode(raw: &CollectionSnapshot) -> StoreResult<Self> {
        let entries = raw
            .documents
            .iter()
            .map(|document| {
                Ok(SnapshotEntry {
                    revision: document.revision,
                    record: serde_json::from_value(document.body.clone())?,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Self {
            version: raw.version,
            entries,
        })
    }

    /// Builds a snapshot from records, all at revision 1.
    pub fn from_records(version: StoreVersion, records: Vec<T>) -> Self {
        Self {
            version,
            entries: records
                .into_iter()
                .map(|record| SnapshotEntry {
                    revision: 1,
                    record,
                })
                .collect(),
        }
    }

    pub fn version(&self) -> StoreVersion {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SnapshotEntry<T>] {
        &self.entries
    }

    pub fn records(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|entry| &entry.record)
    }

    /// Owned copy of all records, in snapshot order.
    pub fn to_records(&self) -> Vec<T> {
        self.records().cloned().collect()
    }

    pub fn entry(&self, doc_id: &str) -> Option<&SnapshotEntry<T>> {
        self.entries
            .iter()
            .find(|entry| entry.record.doc_id() == doc_id)
    }

    pub fn get(&self, doc_id: &str) -> Option<&T> {
        self.entry(doc_id).map(|entry| &entry.record)
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.entry(doc_id).is_some()
    }
}
