//! Project use-case service.
//!
//! # Responsibility
//! - Keep the project snapshot current through a subscription.
//! - Run project CRUD and task mutations as single batches.
//!
//! # Invariants
//! - Task mutations are checked against the revision of the snapshot they
//!   were planned on.

use crate::csv_io::export::{export_projects, CsvExport};
use crate::error::RosterResult;
use crate::model::project::Project;
use crate::ops::project_ops::{
    plan_create_project, plan_delete_project, plan_edit_project, plan_task_update, ProjectDraft,
    ProjectEdit, TaskPatch, TaskUpdatePlan,
};
use crate::ops::DeleteConfirmation;
use crate::service::{commit_batch, logged};
use crate::store::{DocumentStore, LiveCollection, Snapshot};
use chrono::NaiveDate;
use log::{debug, warn};

const MODULE: &str = "projects";

/// Result of a task mutation request.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskUpdateOutcome {
    /// The project as committed.
    Applied(Project),
    /// The project is missing from the current snapshot; nothing was written.
    ProjectNotFound,
    TaskNotFound,
}

pub struct ProjectService<'s, S: DocumentStore + ?Sized> {
    store: &'s S,
    projects: LiveCollection<Project>,
}

impl<'s, S: DocumentStore + ?Sized> ProjectService<'s, S> {
    pub fn new(store: &'s S) -> RosterResult<Self> {
        let projects = logged(
            "projects_subscribe",
            MODULE,
            LiveCollection::<Project>::attach(store).map_err(Into::into),
        )?;
        Ok(Self { store, projects })
    }

    /// Latest delivered project snapshot.
    pub fn projects(&self) -> Snapshot<Project> {
        self.projects.latest()
    }

    /// Creates a project with one default task starting `today`.
    pub fn add(&self, draft: ProjectDraft, today: NaiveDate) -> RosterResult<Project> {
        logged("project_add", MODULE, self.try_add(draft, today))
    }

    pub fn edit(&self, project_id: &str, edit: ProjectEdit) -> RosterResult<Project> {
        logged("project_edit", MODULE, self.try_edit(project_id, edit))
    }

    /// Deletes a project present in the current snapshot.
    pub fn delete(&self, project_id: &str, confirmation: DeleteConfirmation) -> RosterResult<()> {
        logged(
            "project_delete",
            MODULE,
            plan_delete_project(&self.projects.latest(), project_id, confirmation).and_then(
                |batch| commit_batch(self.store, "project_delete", MODULE, &batch),
            ),
        )?;
        Ok(())
    }

    /// Applies `patch` to one task of one project.
    ///
    /// A project missing from the snapshot is logged and reported as
    /// `ProjectNotFound` rather than an error. A project changed since the
    /// snapshot fails with `StaleSnapshot`.
    pub fn update_task(
        &self,
        project_id: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> RosterResult<TaskUpdateOutcome> {
        logged(
            "task_update",
            MODULE,
            self.try_update_task(project_id, task_id, patch),
        )
    }

    /// Moves a task to a new date range.
    pub fn update_task_dates(
        &self,
        project_id: &str,
        task_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RosterResult<TaskUpdateOutcome> {
        self.update_task(project_id, task_id, &TaskPatch::dates(start_date, end_date))
    }

    pub fn export(&self) -> RosterResult<CsvExport> {
        logged(
            "project_export",
            MODULE,
            export_projects(&self.projects.latest().to_records()),
        )
    }

    fn try_add(&self, draft: ProjectDraft, today: NaiveDate) -> RosterResult<Project> {
        let planned = plan_create_project(&self.projects.latest(), draft, today)?;
        commit_batch(self.store, "project_add", MODULE, &planned.batch)?;
        Ok(planned.record)
    }

    fn try_edit(&self, project_id: &str, edit: ProjectEdit) -> RosterResult<Project> {
        let planned = plan_edit_project(&self.projects.latest(), project_id, edit)?;
        commit_batch(self.store, "project_edit", MODULE, &planned.batch)?;
        Ok(planned.record)
    }

    fn try_update_task(
        &self,
        project_id: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> RosterResult<TaskUpdateOutcome> {
        let snapshot = self.projects.latest();
        match plan_task_update(&snapshot, project_id, task_id, patch)? {
            TaskUpdatePlan::Apply {
                planned,
                base_revision,
            } => {
                debug!(
                    "event=task_update module={MODULE} status=start project_id={project_id} task_id={task_id} base_revision={base_revision}"
                );
                commit_batch(self.store, "task_update", MODULE, &planned.batch)?;
                Ok(TaskUpdateOutcome::Applied(planned.record))
            }
            TaskUpdatePlan::ProjectNotFound => {
                warn!(
                    "event=task_update module={MODULE} status=skipped reason=project_not_found project_id={project_id} version={}",
                    snapshot.version()
                );
                Ok(TaskUpdateOutcome::ProjectNotFound)
            }
            TaskUpdatePlan::TaskNotFound => {
                warn!(
                    "event=task_update module={MODULE} status=skipped reason=task_not_found project_id={project_id} task_id={task_id}"
                );
                Ok(TaskUpdateOutcome::TaskNotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ProjectService, TaskUpdateOutcome};
    use crate::db::open_db_in_memory;
    use crate::error::RosterError;
    use crate::ops::project_ops::{ProjectDraft, ProjectEdit};
    use crate::ops::DeleteConfirmation;
    use crate::store::{Collection, DocumentStore, SqliteDocumentStore};
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn draft(id: &str) -> ProjectDraft {
        ProjectDraft {
            id: id.to_string(),
            name: "県道改良".to_string(),
        }
    }

    #[test]
    fn add_edit_delete_round_through_the_store() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        let service = ProjectService::new(&store).unwrap();

        let project = service.add(draft("K-1"), date(4, 1)).unwrap();
        assert_eq!(project.tasks.len(), 1);

        let mut edit = ProjectEdit::from_current(&project);
        edit.location = "山口市".to_string();
        service.edit("K-1", edit).unwrap();
        let stored = service.projects();
        assert_eq!(stored.get("K-1").unwrap().location, "山口市");
        assert_eq!(stored.get("K-1").unwrap().tasks, project.tasks);

        service
            .delete("K-1", DeleteConfirmation::parse("DELETE").unwrap())
            .unwrap();
        assert!(service.projects().is_empty());
    }

    #[test]
    fn delete_of_unknown_project_commits_nothing() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        let service = ProjectService::new(&store).unwrap();
        service.add(draft("K-1"), date(4, 1)).unwrap();
        let version = service.projects().version();

        let err = service
            .delete("K-9", DeleteConfirmation::parse("DELETE").unwrap())
            .unwrap_err();
        assert!(matches!(err, RosterError::NotFound { ref id, .. } if id == "K-9"));
        assert_eq!(service.projects().version(), version);
        assert_eq!(store.snapshot(Collection::Projects).unwrap().version, version);
    }

    #[test]
    fn task_dates_update_and_missing_targets() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        let service = ProjectService::new(&store).unwrap();
        service.add(draft("K-1"), date(4, 1)).unwrap();

        let outcome = service
            .update_task_dates("K-1", "K-1", date(4, 10), date(4, 20))
            .unwrap();
        let TaskUpdateOutcome::Applied(project) = outcome else {
            panic!("expected applied outcome");
        };
        assert_eq!(project.tasks[0].start_date, date(4, 10));
        assert_eq!(service.projects().get("K-1").unwrap(), &project);

        assert_eq!(
            service
                .update_task_dates("K-9", "K-9", date(4, 10), date(4, 20))
                .unwrap(),
            TaskUpdateOutcome::ProjectNotFound
        );
        assert_eq!(
            service
                .update_task_dates("K-1", "X", date(4, 10), date(4, 20))
                .unwrap(),
            TaskUpdateOutcome::TaskNotFound
        );
    }

    #[test]
    fn duplicate_project_id_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        let service = ProjectService::new(&store).unwrap();
        service.add(draft("K-1"), date(4, 1)).unwrap();
        assert!(matches!(
            service.add(draft("K-1"), date(4, 1)),
            Err(RosterError::DuplicateId { .. })
        ));
    }
}
