//! Pure operation planners.
//!
//! # Responsibility
//! - Turn `(current snapshot, validated input)` into a `WriteBatch` or a
//!   rejection, without touching storage.
//! - Own every domain rule applied before a write (duplicate ids, defaults,
//!   referential cleanup, confirmation).
//!
//! # Invariants
//! - Planners never perform I/O; services commit the returned batch.
//! - A rejected plan produces no batch at all.

pub mod confirmation;
pub mod project_ops;
pub mod seed_ops;
pub mod shain_ops;

pub use confirmation::{DeleteConfirmation, DELETE_CONFIRMATION_PHRASE};

use crate::store::WriteBatch;

/// Result of a successful plan: the record as it will be stored and the
/// batch that stores it.
#[derive(Debug, Clone, PartialEq)]
pub struct Planned<T> {
    pub record: T,
    pub batch: WriteBatch,
}
