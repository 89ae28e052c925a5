//! Initial data load planner.
//!
//! # Invariants
//! - Seeding writes only into empty destinations; a partially populated
//!   store is never topped up.
//! - All seeded records land in one batch of `Create` entries, so a record
//!   written concurrently by another client fails the whole seed.
//! - Ids are unique within each seeded collection.

use crate::error::{RosterError, RosterResult};
use crate::model::employee::Employee;
use crate::model::project::Project;
use crate::model::validation::ValidationError;
use crate::store::{Document, WriteBatch};
use std::collections::HashSet;

/// Plans the seed of `projects` and `employees`.
///
/// `projects_empty` and `shain_empty` must come from a fresh store read,
/// not from a cached snapshot.
pub fn plan_seed(
    projects_empty: bool,
    shain_empty: bool,
    projects: &[Project],
    employees: &[Employee],
) -> RosterResult<WriteBatch> {
    if !projects_empty || !shain_empty {
        return Err(RosterError::SeedConflict {
            projects_present: !projects_empty,
            shain_present: !shain_empty,
        });
    }

    let mut batch = WriteBatch::new();
    let mut project_ids = HashSet::new();
    for project in projects {
        project.validate()?;
        unique_id(&mut project_ids, "project", project)?;
        batch.create(project)?;
    }
    let mut employee_ids = HashSet::new();
    for employee in employees {
        employee.validate()?;
        unique_id(&mut employee_ids, "employee", employee)?;
        batch.create(employee)?;
    }
    Ok(batch)
}

fn unique_id<'r, T: Document>(
    seen: &mut HashSet<&'r str>,
    kind: &'static str,
    record: &'r T,
) -> Result<(), ValidationError> {
    if seen.insert(record.doc_id()) {
        Ok(())
    } else {
        Err(ValidationError::DuplicateRecordId {
            kind,
            id: record.doc_id().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::plan_seed;
    use crate::error::RosterError;
    use crate::model::employee::Employee;
    use crate::model::project::Project;
    use crate::model::validation::ValidationError;
    use crate::store::Collection;
    use chrono::NaiveDate;

    fn employee(number: &str) -> Employee {
        Employee {
            employee_number: number.to_string(),
            family_name: "山田".to_string(),
            given_name: "太郎".to_string(),
            office: "山口支店".to_string(),
            department: "工事部".to_string(),
            email: String::new(),
        }
    }

    #[test]
    fn refuses_when_any_destination_has_data() {
        let err = plan_seed(true, false, &[], &[employee("001")]).unwrap_err();
        assert!(matches!(
            err,
            RosterError::SeedConflict {
                projects_present: false,
                shain_present: true
            }
        ));
    }

    #[test]
    fn plans_one_create_per_record() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let projects = vec![Project::new("K-1", "県道改良", today)];
        let batch = plan_seed(true, true, &projects, &[employee("001"), employee("002")]).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.entries_for(Collection::Projects).count(), 1);
        assert!(batch.entries().iter().all(|entry| entry.op.kind() == "create"));
    }

    #[test]
    fn repeated_employee_number_in_sheet_is_a_validation_error() {
        let err = plan_seed(true, true, &[], &[employee("001"), employee("001")]).unwrap_err();
        assert!(matches!(
            err,
            RosterError::Validation(ValidationError::DuplicateRecordId { kind: "employee", ref id })
                if id == "001"
        ));
    }

    #[test]
    fn invalid_record_rejects_whole_seed() {
        let err = plan_seed(true, true, &[], &[employee("001"), employee(" ")]).unwrap_err();
        assert!(matches!(err, RosterError::Validation(_)));
    }
}
