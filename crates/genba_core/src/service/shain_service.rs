//! Roster use-case service.
//!
//! # Responsibility
//! - Keep the roster and project snapshots current through subscriptions.
//! - Run roster CRUD and the delete cascade as single batches.

use crate::csv_io::export::{export_employees, CsvExport};
use crate::error::RosterResult;
use crate::model::employee::{Employee, EmployeeId};
use crate::model::project::{Project, ProjectId};
use crate::ops::shain_ops::{
    dangling_assignments, plan_create_employee, plan_delete_employee, plan_edit_employee,
    EmployeeDraft, EmployeeEdit,
};
use crate::ops::DeleteConfirmation;
use crate::service::{commit_batch, logged};
use crate::store::{DocumentStore, LiveCollection, Snapshot};
use log::info;

const MODULE: &str = "shain";

/// Outcome of a committed employee delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeDeleteReport {
    pub employee_id: EmployeeId,
    /// Projects whose task assignments were rewritten.
    pub updated_projects: Vec<ProjectId>,
}

pub struct ShainService<'s, S: DocumentStore + ?Sized> {
    store: &'s S,
    roster: LiveCollection<Employee>,
    projects: LiveCollection<Project>,
}

impl<'s, S: DocumentStore + ?Sized> ShainService<'s, S> {
    /// Subscribes to the roster and project collections of `store`.
    pub fn new(store: &'s S) -> RosterResult<Self> {
        let subscribe = || -> RosterResult<_> {
            Ok((
                LiveCollection::<Employee>::attach(store)?,
                LiveCollection::<Project>::attach(store)?,
            ))
        };
        let (roster, projects) = logged("shain_subscribe", MODULE, subscribe())?;
        Ok(Self {
            store,
            roster,
            projects,
        })
    }

    /// Latest delivered roster snapshot.
    pub fn employees(&self) -> Snapshot<Employee> {
        self.roster.latest()
    }

    pub fn add(&self, draft: EmployeeDraft) -> RosterResult<Employee> {
        logged("shain_add", MODULE, self.try_add(draft))
    }

    pub fn edit(&self, employee_id: &str, edit: EmployeeEdit) -> RosterResult<Employee> {
        logged("shain_edit", MODULE, self.try_edit(employee_id, edit))
    }

    /// Deletes the employee and unassigns it from every task in one batch.
    pub fn delete(
        &self,
        employee_id: &str,
        confirmation: DeleteConfirmation,
    ) -> RosterResult<EmployeeDeleteReport> {
        logged(
            "shain_delete",
            MODULE,
            self.try_delete(employee_id, confirmation),
        )
    }

    /// Exports the latest roster snapshot; empty roster -> `EmptyExport`.
    pub fn export(&self) -> RosterResult<CsvExport> {
        logged(
            "shain_export",
            MODULE,
            export_employees(&self.roster.latest().to_records()),
        )
    }

    /// `(project, employee)` pairs whose employee is missing from the roster.
    pub fn dangling_assignments(&self) -> Vec<(ProjectId, EmployeeId)> {
        dangling_assignments(&self.roster.latest(), &self.projects.latest())
    }

    fn try_add(&self, draft: EmployeeDraft) -> RosterResult<Employee> {
        let planned = plan_create_employee(&self.roster.latest(), draft)?;
        commit_batch(self.store, "shain_add", MODULE, &planned.batch)?;
        Ok(planned.record)
    }

    fn try_edit(&self, employee_id: &str, edit: EmployeeEdit) -> RosterResult<Employee> {
        let planned = plan_edit_employee(&self.roster.latest(), employee_id, edit)?;
        commit_batch(self.store, "shain_edit", MODULE, &planned.batch)?;
        Ok(planned.record)
    }

    fn try_delete(
        &self,
        employee_id: &str,
        confirmation: DeleteConfirmation,
    ) -> RosterResult<EmployeeDeleteReport> {
        let plan = plan_delete_employee(
            &self.roster.latest(),
            employee_id,
            &self.projects.latest(),
            confirmation,
        )?;
        commit_batch(self.store, "shain_delete", MODULE, &plan.batch)?;
        info!(
            "event=shain_delete module={MODULE} status=ok employee_id={employee_id} updated_projects={}",
            plan.updated_projects.len()
        );
        Ok(EmployeeDeleteReport {
            employee_id: employee_id.to_string(),
            updated_projects: plan.updated_projects,
        })
    }
}
