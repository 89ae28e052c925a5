//! Store-backed use-case services.
//!
//! # Responsibility
//! - Hold live collection snapshots and feed them to the pure planners.
//! - Commit planned batches and log every failure at the boundary.
//!
//! # Invariants
//! - A service operation either commits one batch or has no persisted effect.
//! - Services stay storage-agnostic; they only see `DocumentStore`.

pub mod project_service;
pub mod seed_service;
pub mod shain_service;

use crate::error::{log_failure, RosterResult};
use crate::store::{DocumentStore, StoreVersion, WriteBatch};
use log::info;
use std::time::Instant;

/// Commits `batch` and logs the outcome under `event`.
pub(crate) fn commit_batch<S: DocumentStore + ?Sized>(
    store: &S,
    event: &str,
    module: &str,
    batch: &WriteBatch,
) -> RosterResult<StoreVersion> {
    let started_at = Instant::now();
    let version = store.commit(batch)?;
    info!(
        "event={event} module={module} status=ok ops={} version={version} duration_ms={}",
        batch.len(),
        started_at.elapsed().as_millis()
    );
    Ok(version)
}

/// Logs `result` when it failed and passes it through.
pub(crate) fn logged<T>(event: &str, module: &str, result: RosterResult<T>) -> RosterResult<T> {
    result.inspect_err(|err| log_failure(event, module, err))
}
