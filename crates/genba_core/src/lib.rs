//! Core domain logic for the genba roster and project tracker.
//! This crate is the single source of truth for record invariants.

pub mod config;
pub mod csv_io;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod ops;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use csv_io::codec::{parse_csv, serialize_csv, CsvRow};
pub use csv_io::export::{export_employees, export_projects, write_export, CsvExport};
pub use csv_io::transform::{employees_from_csv, transform_csv_to_projects, TransformError};
pub use error::{RosterError, RosterResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::employee::{Employee, EmployeeId};
pub use model::project::{Project, ProjectId, StaffingInfo, Task, TaskId};
pub use model::validation::ValidationError;
pub use ops::project_ops::{ProjectDraft, ProjectEdit, TaskPatch};
pub use ops::shain_ops::{EmployeeDraft, EmployeeEdit};
pub use ops::DeleteConfirmation;
pub use service::project_service::{ProjectService, TaskUpdateOutcome};
pub use service::seed_service::{SeedReport, SeedService, SeedSource};
pub use service::shain_service::{EmployeeDeleteReport, ShainService};
pub use store::{Collection, DocumentStore, SqliteDocumentStore, StoreError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
