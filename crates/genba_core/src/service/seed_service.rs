//! One-time bulk population of an empty store.
//!
//! # Invariants
//! - Emptiness is read from the store at call time, never from a cached
//!   snapshot.
//! - Either every seeded record is written or none is.
//! - A record created by another client between the emptiness check and the
//!   commit turns the seed into a `SeedConflict`.

use crate::csv_io::transform::{employees_from_csv, transform_csv_to_projects};
use crate::error::{RosterError, RosterResult};
use crate::ops::seed_ops::plan_seed;
use crate::service::{commit_batch, logged};
use crate::store::{Collection, DocumentStore};
use chrono::NaiveDate;
use log::info;
use std::fs;
use std::path::Path;

const MODULE: &str = "seed";

/// The three source sheets of a seed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSource {
    pub kouji_csv: String,
    pub shain_csv: String,
    pub keireki_csv: String,
}

impl SeedSource {
    /// Sample dataset compiled into the crate.
    pub fn bundled() -> Self {
        Self {
            kouji_csv: include_str!("../../seed/kouji.csv").to_string(),
            shain_csv: include_str!("../../seed/shain.csv").to_string(),
            keireki_csv: include_str!("../../seed/keireki.csv").to_string(),
        }
    }

    /// Reads the sheets from disk; a missing work-history file counts as empty.
    pub fn from_files(kouji: &Path, shain: &Path, keireki: Option<&Path>) -> RosterResult<Self> {
        let keireki_csv = match keireki {
            Some(path) => fs::read_to_string(path)?,
            None => String::new(),
        };
        Ok(Self {
            kouji_csv: fs::read_to_string(kouji)?,
            shain_csv: fs::read_to_string(shain)?,
            keireki_csv,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub projects: usize,
    pub employees: usize,
}

pub struct SeedService<'s, S: DocumentStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: DocumentStore + ?Sized> SeedService<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Seeds both collections from `source`.
    ///
    /// Refuses with `SeedConflict` when either collection already holds data.
    pub fn seed(&self, source: &SeedSource, today: NaiveDate) -> RosterResult<SeedReport> {
        logged("seed", MODULE, self.try_seed(source, today))
    }

    fn try_seed(&self, source: &SeedSource, today: NaiveDate) -> RosterResult<SeedReport> {
        let projects_empty = self.store.is_empty(Collection::Projects)?;
        let shain_empty = self.store.is_empty(Collection::Shain)?;
        if !projects_empty || !shain_empty {
            return Err(RosterError::SeedConflict {
                projects_present: !projects_empty,
                shain_present: !shain_empty,
            });
        }

        let projects = transform_csv_to_projects(
            &source.kouji_csv,
            &source.shain_csv,
            &source.keireki_csv,
            today,
        )?;
        let employees = employees_from_csv(&source.shain_csv);
        let batch = plan_seed(projects_empty, shain_empty, &projects, &employees)?;
        commit_batch(self.store, "seed", MODULE, &batch).map_err(|err| match err {
            RosterError::DuplicateId { collection, .. } => RosterError::SeedConflict {
                projects_present: collection == Collection::Projects,
                shain_present: collection == Collection::Shain,
            },
            other => other,
        })?;

        info!(
            "event=seed module={MODULE} status=ok projects={} employees={}",
            projects.len(),
            employees.len()
        );
        Ok(SeedReport {
            projects: projects.len(),
            employees: employees.len(),
        })
    }
}
