//! Employee create/edit/delete planners, including the assignment cascade.
//!
//! # Invariants
//! - A new employee number must not exist in the current roster snapshot.
//! - Deleting an employee removes the employee document and strips the
//!   employee from every task in the same batch.
//! - Projects that never referenced the employee receive no write.
//! - Deleting an id that is neither in the roster nor assigned anywhere is
//!   `NotFound`; nothing is committed.

use crate::error::{RosterError, RosterResult};
use crate::model::employee::{Employee, EmployeeId, DEFAULT_DEPARTMENT, DEFAULT_OFFICE};
use crate::model::project::{Project, ProjectId, Task};
use crate::model::validation::ValidationError;
use crate::ops::project_ops::TasksField;
use crate::ops::{DeleteConfirmation, Planned};
use crate::store::{Collection, Snapshot, WriteBatch};

/// Input for a new roster entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeDraft {
    pub employee_number: String,
    pub family_name: String,
    pub given_name: String,
    /// Blank falls back to `DEFAULT_OFFICE`.
    pub office: String,
    /// Blank falls back to `DEFAULT_DEPARTMENT`.
    pub department: String,
    pub email: String,
}

/// Replacement values for every editable roster field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeEdit {
    pub family_name: String,
    pub given_name: String,
    pub office: String,
    pub department: String,
    pub email: String,
}

impl EmployeeEdit {
    /// Edit pre-filled with the current values, for partial changes.
    pub fn from_current(employee: &Employee) -> Self {
        Self {
            family_name: employee.family_name.clone(),
            given_name: employee.given_name.clone(),
            office: employee.office.clone(),
            department: employee.department.clone(),
            email: employee.email.clone(),
        }
    }
}

/// Planned cascade for one employee delete.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeDeletePlan {
    pub batch: WriteBatch,
    /// Projects whose task list is rewritten, in snapshot order.
    pub updated_projects: Vec<ProjectId>,
}

pub fn plan_create_employee(
    roster: &Snapshot<Employee>,
    draft: EmployeeDraft,
) -> RosterResult<Planned<Employee>> {
    let employee = Employee {
        employee_number: draft.employee_number.trim().to_string(),
        family_name: draft.family_name.trim().to_string(),
        given_name: draft.given_name.trim().to_string(),
        office: non_blank_or(draft.office, DEFAULT_OFFICE),
        department: non_blank_or(draft.department, DEFAULT_DEPARTMENT),
        email: draft.email.trim().to_string(),
    };
    employee.validate()?;
    if employee.family_name.is_empty() {
        return Err(ValidationError::BlankField { field: "姓" }.into());
    }
    if employee.given_name.is_empty() {
        return Err(ValidationError::BlankField { field: "名" }.into());
    }
    if roster.contains(employee.id()) {
        return Err(RosterError::DuplicateId {
            collection: Collection::Shain,
            id: employee.employee_number,
        });
    }

    let mut batch = WriteBatch::new();
    batch.create(&employee)?;
    Ok(Planned {
        record: employee,
        batch,
    })
}

pub fn plan_edit_employee(
    roster: &Snapshot<Employee>,
    employee_id: &str,
    edit: EmployeeEdit,
) -> RosterResult<Planned<Employee>> {
    if !roster.contains(employee_id) {
        return Err(RosterError::NotFound {
            collection: Collection::Shain,
            id: employee_id.to_string(),
        });
    }

    let employee = Employee {
        employee_number: employee_id.to_string(),
        family_name: edit.family_name.trim().to_string(),
        given_name: edit.given_name.trim().to_string(),
        office: edit.office.trim().to_string(),
        department: edit.department.trim().to_string(),
        email: edit.email.trim().to_string(),
    };
    employee.validate()?;

    let mut batch = WriteBatch::new();
    batch.update(Collection::Shain, employee_id, &employee, None)?;
    Ok(Planned {
        record: employee,
        batch,
    })
}

/// Plans the employee delete plus assignment cleanup over `projects`.
///
/// An id missing from `roster` is still accepted while some task assigns
/// it, so dangling ids can be cleaned out. Each project update carries the
/// snapshot revision, so a concurrent task-list change fails the whole batch
/// instead of being overwritten.
pub fn plan_delete_employee(
    roster: &Snapshot<Employee>,
    employee_id: &str,
    projects: &Snapshot<Project>,
    _confirmation: DeleteConfirmation,
) -> RosterResult<EmployeeDeletePlan> {
    let assigned = projects
        .records()
        .any(|project| project.references_employee(employee_id));
    if !roster.contains(employee_id) && !assigned {
        return Err(RosterError::NotFound {
            collection: Collection::Shain,
            id: employee_id.to_string(),
        });
    }

    let mut batch = WriteBatch::new();
    batch.delete(Collection::Shain, employee_id);

    let mut updated_projects = Vec::new();
    for entry in projects.entries() {
        let Some(tasks) = strip_employee_from_tasks(&entry.record, employee_id) else {
            continue;
        };
        batch.update(
            Collection::Projects,
            entry.record.id.as_str(),
            &TasksField { tasks: &tasks },
            Some(entry.revision),
        )?;
        updated_projects.push(entry.record.id.clone());
    }

    Ok(EmployeeDeletePlan {
        batch,
        updated_projects,
    })
}

/// Task list of `project` with `employee_id` unassigned everywhere.
///
/// Returns `None` when no task referenced the employee. Task order and every
/// other field are preserved.
pub fn strip_employee_from_tasks(project: &Project, employee_id: &str) -> Option<Vec<Task>> {
    if !project.references_employee(employee_id) {
        return None;
    }
    Some(
        project
            .tasks
            .iter()
            .map(|task| {
                let mut task = task.clone();
                task.assigned_to.remove(employee_id);
                task
            })
            .collect(),
    )
}

/// Employee ids referenced by any task but missing from `roster`.
pub fn dangling_assignments(
    roster: &Snapshot<Employee>,
    projects: &Snapshot<Project>,
) -> Vec<(ProjectId, EmployeeId)> {
    let mut dangling = Vec::new();
    for project in projects.records() {
        for task in &project.tasks {
            for employee_id in &task.assigned_to {
                let pair = (project.id.clone(), employee_id.clone());
                if !roster.contains(employee_id) && !dangling.contains(&pair) {
                    dangling.push(pair);
                }
            }
        }
    }
    dangling
}

fn non_blank_or(value: String, fallback: &str) -> String {
    match value.trim() {
        "" => fallback.to_string(),
        trimmed => trimmed.to_string(),
    }
}
