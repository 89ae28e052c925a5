//! Domain model for the roster (`shain`) and project (`kouji`) collections.
//!
//! # Responsibility
//! - Define the records persisted in the document store.
//! - Keep field naming aligned with the stored document/CSV column names.
//!
//! # Invariants
//! - Employees are identified by `employee_number`; projects by a
//!   user-supplied `id`.
//! - Every record must pass `validate()` before it is written.

pub mod employee;
pub mod project;
pub mod validation;
