//! Validation errors shared by employee and project records.

use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Record-level invariant violation detected before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Storage key is empty after trim.
    BlankId { kind: &'static str },
    /// Required text field is empty after trim.
    BlankField { field: &'static str },
    /// Email is present but not shaped like `local@domain.tld`.
    InvalidEmail(String),
    /// Task progress must stay within `0..=100`.
    ProgressOutOfRange { task_id: String, progress: u8 },
    /// Task ends before it starts.
    InvalidDateRange {
        task_id: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Two tasks inside one project share the same id.
    DuplicateTaskId { project_id: String, task_id: String },
    /// One input set names the same record twice.
    DuplicateRecordId { kind: &'static str, id: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId { kind } => write!(f, "{kind} id must not be blank"),
            Self::BlankField { field } => write!(f, "field `{field}` must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::ProgressOutOfRange { task_id, progress } => {
                write!(f, "task {task_id} progress {progress} is outside 0..=100")
            }
            Self::InvalidDateRange {
                task_id,
                start,
                end,
            } => write!(f, "task {task_id} ends ({end}) before it starts ({start})"),
            Self::DuplicateTaskId {
                project_id,
                task_id,
            } => write!(f, "project {project_id} has duplicate task id {task_id}"),
            Self::DuplicateRecordId { kind, id } => write!(f, "{kind} id {id} appears twice"),
        }
    }
}

impl Error for ValidationError {}
