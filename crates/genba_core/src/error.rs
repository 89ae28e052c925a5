//! Operation-level error kinds and user-facing notices.
//!
//! # Invariants
//! - Every service operation returns `RosterResult`; nothing panics into the
//!   caller.
//! - A failed operation has no persisted effect.

use crate::csv_io::codec::CsvCodecError;
use crate::csv_io::transform::TransformError;
use crate::model::validation::ValidationError;
use crate::store::{Collection, StoreError};
use log::{error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug)]
pub enum RosterError {
    /// Create rejected: the id is already used in the collection.
    DuplicateId { collection: Collection, id: String },
    /// Referenced record is missing from the current snapshot or store.
    NotFound { collection: Collection, id: String },
    /// Store write/read failed; no automatic retry.
    RemoteWriteFailure(StoreError),
    /// Export requested over an empty collection.
    EmptyExport { collection: Collection },
    /// Seed refused because at least one destination collection has data.
    SeedConflict {
        projects_present: bool,
        shain_present: bool,
    },
    /// Write is based on a snapshot older than the stored document.
    StaleSnapshot { collection: Collection, id: String },
    /// Destructive action lacked the exact confirmation phrase.
    NotConfirmed,
    Validation(ValidationError),
    Transform(TransformError),
    Csv(CsvCodecError),
    Io(std::io::Error),
}

impl RosterError {
    /// Message shown to the user for this failure.
    pub fn user_notice(&self) -> String {
        match self {
            Self::DuplicateId {
                collection: Collection::Shain,
                ..
            } => "エラー: この社員番号は既に使用されています。".to_string(),
            Self::DuplicateId {
                collection: Collection::Projects,
                ..
            } => "エラー: この工事IDは既に使用されています。".to_string(),
            Self::NotFound { collection, id } => {
                format!("エラー: {collection}/{id} が見つかりません。")
            }
            Self::EmptyExport { .. } => "エクスポートするデータがありません。".to_string(),
            Self::SeedConflict { .. } => {
                "Data already exists in one or more collections. Seeding was cancelled."
                    .to_string()
            }
            Self::StaleSnapshot { .. } => {
                "エラー: データが更新されています。最新の状態を確認してください。".to_string()
            }
            Self::NotConfirmed => "削除はキャンセルされました。".to_string(),
            Self::Validation(err) => format!("入力エラー: {err}"),
            Self::Transform(err) => format!("CSVエラー: {err}"),
            Self::RemoteWriteFailure(_) | Self::Csv(_) | Self::Io(_) => {
                "An error occurred. Check the console for details.".to_string()
            }
        }
    }

    /// Whether the failure is an expected user-level rejection rather than a
    /// system fault.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            Self::RemoteWriteFailure(_) | Self::Csv(_) | Self::Io(_)
        )
    }
}

impl Display for RosterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId { collection, id } => {
                write!(f, "id already exists: {collection}/{id}")
            }
            Self::NotFound { collection, id } => write!(f, "record not found: {collection}/{id}"),
            Self::RemoteWriteFailure(err) => write!(f, "store operation failed: {err}"),
            Self::EmptyExport { collection } => {
                write!(f, "nothing to export: collection {collection} is empty")
            }
            Self::SeedConflict {
                projects_present,
                shain_present,
            } => write!(
                f,
                "seed refused: destination not empty (projects={projects_present}, shain={shain_present})"
            ),
            Self::StaleSnapshot { collection, id } => {
                write!(f, "snapshot is stale for {collection}/{id}")
            }
            Self::NotConfirmed => write!(f, "destructive action was not confirmed"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Transform(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RosterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RemoteWriteFailure(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Transform(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RosterError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::AlreadyExists { collection, doc_id } => Self::DuplicateId {
                collection,
                id: doc_id,
            },
            StoreError::Missing { collection, doc_id } => Self::NotFound {
                collection,
                id: doc_id,
            },
            StoreError::RevisionConflict {
                collection, doc_id, ..
            } => Self::StaleSnapshot {
                collection,
                id: doc_id,
            },
            other => Self::RemoteWriteFailure(other),
        }
    }
}

impl From<ValidationError> for RosterError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TransformError> for RosterError {
    fn from(value: TransformError) -> Self {
        Self::Transform(value)
    }
}

impl From<CsvCodecError> for RosterError {
    fn from(value: CsvCodecError) -> Self {
        Self::Csv(value)
    }
}

impl From<std::io::Error> for RosterError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Logs a failed operation at the service boundary.
///
/// Rejections go to `warn`, system faults to `error`.
pub(crate) fn log_failure(event: &str, module: &str, err: &RosterError) {
    if err.is_rejection() {
        warn!("event={event} module={module} status=rejected error={err}");
    } else {
        error!("event={event} module={module} status=error error={err}");
    }
}

#[cfg(test)]
mod tests {
    use super::RosterError;
    use crate::store::{Collection, StoreError};

    #[test]
    fn store_errors_map_to_operation_kinds() {
        let duplicate: RosterError = StoreError::AlreadyExists {
            collection: Collection::Shain,
            doc_id: "001".to_string(),
        }
        .into();
        assert!(matches!(duplicate, RosterError::DuplicateId { ref id, .. } if id == "001"));
        assert!(duplicate.user_notice().contains("社員番号"));

        let stale: RosterError = StoreError::RevisionConflict {
            collection: Collection::Projects,
            doc_id: "K-1".to_string(),
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(matches!(stale, RosterError::StaleSnapshot { .. }));

        let fault: RosterError = StoreError::InvalidData("broken".to_string()).into();
        assert!(!fault.is_rejection());
        assert!(fault.user_notice().starts_with("An error occurred"));
    }
}
