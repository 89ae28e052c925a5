//! Project create/edit/delete planners and single-task mutation.
//!
//! # Invariants
//! - A task mutation rewrites the whole task list of one project and leaves
//!   sibling tasks untouched.
//! - Task mutations carry the snapshot revision of the project; a project
//!   changed since the snapshot fails the commit instead of being
//!   overwritten.

use crate::error::{RosterError, RosterResult};
use crate::model::employee::EmployeeId;
use crate::model::project::{Project, Task, DEFAULT_PROJECT_NAME};
use crate::ops::{DeleteConfirmation, Planned};
use crate::store::{Collection, Revision, Snapshot, WriteBatch};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Update payload replacing a project's task list.
#[derive(Debug, Serialize)]
pub(crate) struct TasksField<'a> {
    pub(crate) tasks: &'a [Task],
}

/// Update payload for the editable project header fields.
#[derive(Debug, Serialize)]
struct HeaderFields<'a> {
    name: &'a str,
    hattyusha: &'a str,
    basho: &'a str,
    #[serde(rename = "hattyuTantou")]
    hattyu_tantou: &'a str,
}

/// Input for a new project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub id: String,
    /// Blank falls back to `DEFAULT_PROJECT_NAME`.
    pub name: String,
}

/// Replacement values for the editable project header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectEdit {
    pub name: String,
    pub client: String,
    pub location: String,
    pub client_contact: String,
}

impl ProjectEdit {
    pub fn from_current(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            client: project.client.clone(),
            location: project.location.clone(),
            client_contact: project.client_contact.clone(),
        }
    }
}

/// Partial update of one task; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub work_category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: Option<u8>,
    pub assigned_to: Option<BTreeSet<EmployeeId>>,
}

impl TaskPatch {
    /// Patch moving a task to a new date range.
    pub fn dates(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply_to(&self, task: &mut Task) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(work_category) = &self.work_category {
            task.work_category = work_category.clone();
        }
        if let Some(start_date) = self.start_date {
            task.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            task.end_date = end_date;
        }
        if let Some(progress) = self.progress {
            task.progress = progress;
        }
        if let Some(assigned_to) = &self.assigned_to {
            task.assigned_to = assigned_to.clone();
        }
    }
}

/// Planner outcome for a task mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskUpdatePlan {
    Apply {
        planned: Planned<Project>,
        base_revision: Revision,
    },
    /// The project is absent from the snapshot the caller holds.
    ProjectNotFound,
    TaskNotFound,
}

pub fn plan_create_project(
    projects: &Snapshot<Project>,
    draft: ProjectDraft,
    today: NaiveDate,
) -> RosterResult<Planned<Project>> {
    let id = draft.id.trim().to_string();
    let name = match draft.name.trim() {
        "" => DEFAULT_PROJECT_NAME.to_string(),
        name => name.to_string(),
    };
    let project = Project::new(id, name, today);
    project.validate()?;
    if projects.contains(project.id.as_str()) {
        return Err(RosterError::DuplicateId {
            collection: Collection::Projects,
            id: project.id,
        });
    }

    let mut batch = WriteBatch::new();
    batch.create(&project)?;
    Ok(Planned {
        record: project,
        batch,
    })
}

pub fn plan_edit_project(
    projects: &Snapshot<Project>,
    project_id: &str,
    edit: ProjectEdit,
) -> RosterResult<Planned<Project>> {
    let mut project = projects
        .get(project_id)
        .cloned()
        .ok_or_else(|| RosterError::NotFound {
            collection: Collection::Projects,
            id: project_id.to_string(),
        })?;
    project.name = edit.name.trim().to_string();
    project.client = edit.client.trim().to_string();
    project.location = edit.location.trim().to_string();
    project.client_contact = edit.client_contact.trim().to_string();
    project.validate()?;

    let mut batch = WriteBatch::new();
    batch.update(
        Collection::Projects,
        project_id,
        &HeaderFields {
            name: project.name.as_str(),
            hattyusha: project.client.as_str(),
            basho: project.location.as_str(),
            hattyu_tantou: project.client_contact.as_str(),
        },
        None,
    )?;
    Ok(Planned {
        record: project,
        batch,
    })
}

/// Plans a project delete. An id absent from `projects` is `NotFound`.
pub fn plan_delete_project(
    projects: &Snapshot<Project>,
    project_id: &str,
    _confirmation: DeleteConfirmation,
) -> RosterResult<WriteBatch> {
    if !projects.contains(project_id) {
        return Err(RosterError::NotFound {
            collection: Collection::Projects,
            id: project_id.to_string(),
        });
    }
    let mut batch = WriteBatch::new();
    batch.delete(Collection::Projects, project_id);
    Ok(batch)
}

/// Plans `patch` against task `task_id` of project `project_id`.
pub fn plan_task_update(
    projects: &Snapshot<Project>,
    project_id: &str,
    task_id: &str,
    patch: &TaskPatch,
) -> RosterResult<TaskUpdatePlan> {
    let Some(entry) = projects.entry(project_id) else {
        return Ok(TaskUpdatePlan::ProjectNotFound);
    };
    let mut project = entry.record.clone();
    let Some(task) = project.tasks.iter_mut().find(|task| task.id == task_id) else {
        return Ok(TaskUpdatePlan::TaskNotFound);
    };
    patch.apply_to(task);
    project.validate()?;

    let mut batch = WriteBatch::new();
    batch.update(
        Collection::Projects,
        project_id,
        &TasksField {
            tasks: &project.tasks,
        },
        Some(entry.revision),
    )?;
    Ok(TaskUpdatePlan::Apply {
        planned: Planned {
            record: project,
            batch,
        },
        base_revision: entry.revision,
    })
}
