//! Declarative multi-document write batch.
//!
//! Every multi-record operation (cascading delete, seed, single edits) is
//! expressed as an ordered list of `(collection, doc_id, op)` triples and
//! committed through `DocumentStore::commit`, which owns the all-or-nothing
//! guarantee.

use crate::store::{Collection, Document, Revision, StoreError, StoreResult};
use serde::Serialize;
use serde_json::{Map, Value};

/// One write against one document.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert; fails with `StoreError::AlreadyExists` if the key is taken.
    Create(Value),
    /// Insert or fully replace.
    Set(Value),
    /// Merge top-level fields into an existing document.
    Update {
        fields: Map<String, Value>,
        expected_revision: Option<Revision>,
    },
    /// Remove; deleting a missing document is a no-op.
    Delete,
}

impl WriteOp {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Set(_) => "set",
            Self::Update { .. } => "update",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub collection: Collection,
    pub doc_id: String,
    pub op: WriteOp,
}

/// Ordered list of writes committed as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    entries: Vec<BatchEntry>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries targeting `collection`, in batch order.
    pub fn entries_for(&self, collection: Collection) -> impl Iterator<Item = &BatchEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.collection == collection)
    }

    pub fn push(&mut self, collection: Collection, doc_id: impl Into<String>, op: WriteOp) {
        self.entries.push(BatchEntry {
            collection,
            doc_id: doc_id.into(),
            op,
        });
    }

    /// Queues a create-if-absent of `record`.
    pub fn create<T: Document>(&mut self, record: &T) -> StoreResult<()> {
        let body = serde_json::to_value(record)?;
        self.push(T::COLLECTION, record.doc_id(), WriteOp::Create(body));
        Ok(())
    }

    /// Queues an unconditional write of `record`.
    pub fn set<T: Document>(&mut self, record: &T) -> StoreResult<()> {
        let body = serde_json::to_value(record)?;
        self.push(T::COLLECTION, record.doc_id(), WriteOp::Set(body));
        Ok(())
    }

    /// Queues a top-level field merge.
    ///
    /// `fields` must serialize to a JSON object; its keys replace the stored
    /// document's keys of the same name.
    pub fn update<F: Serialize>(
        &mut self,
        collection: Collection,
        doc_id: impl Into<String>,
        fields: &F,
        expected_revision: Option<Revision>,
    ) -> StoreResult<()> {
        let doc_id = doc_id.into();
        let fields = match serde_json::to_value(fields)? {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidData(format!(
                    "update for {collection}/{doc_id} must be an object, got {other}"
                )));
            }
        };
        self.push(
            collection,
            doc_id,
            WriteOp::Update {
                fields,
                expected_revision,
            },
        );
        Ok(())
    }

    pub fn delete(&mut self, collection: Collection, doc_id: impl Into<String>) {
        self.push(collection, doc_id, WriteOp::Delete);
    }
}
