//! Construction project (`kouji`) record and its nested tasks.
//!
//! # Responsibility
//! - Define the project/task shape stored in the `projects` collection.
//! - Provide the small in-place helpers used by operation planners.
//!
//! # Invariants
//! - Task ids are unique inside one project.
//! - `progress` is a percentage in `0..=100`.
//! - `end_date` is never earlier than `start_date`.
//! - `assigned_to` only holds employee numbers of existing employees; the
//!   employee delete cascade keeps this true.

use crate::model::employee::EmployeeId;
use crate::model::validation::ValidationError;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// User-supplied project key in the `projects` collection.
pub type ProjectId = String;
/// Task key, unique within its project.
pub type TaskId = String;

pub const DEFAULT_PROJECT_NAME: &str = "新規工事";
pub const DEFAULT_WORK_CATEGORY: &str = "一般作業";
/// Length of the placeholder task created with a new project.
pub const DEFAULT_TASK_SPAN_DAYS: u64 = 30;

/// One unit of work inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub work_category: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub assigned_to: BTreeSet<EmployeeId>,
}

impl Task {
    /// Placeholder task spanning `DEFAULT_TASK_SPAN_DAYS` from `today`.
    pub fn placeholder(id: impl Into<TaskId>, name: impl Into<String>, today: NaiveDate) -> Self {
        let end_date = today
            .checked_add_days(Days::new(DEFAULT_TASK_SPAN_DAYS))
            .unwrap_or(today);
        Self {
            id: id.into(),
            name: name.into(),
            work_category: DEFAULT_WORK_CATEGORY.to_string(),
            start_date: today,
            end_date,
            progress: 0,
            assigned_to: BTreeSet::new(),
        }
    }

    pub fn is_assigned(&self, employee_id: &str) -> bool {
        self.assigned_to.contains(employee_id)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::BlankId { kind: "task" });
        }
        if self.progress > 100 {
            return Err(ValidationError::ProgressOutOfRange {
                task_id: self.id.clone(),
                progress: self.progress,
            });
        }
        if self.end_date < self.start_date {
            return Err(ValidationError::InvalidDateRange {
                task_id: self.id.clone(),
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}

/// Planned staffing for one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingInfo {
    #[serde(default)]
    pub headcount: u32,
    #[serde(default)]
    pub note: String,
}

/// Tracked construction project.
///
/// Field names follow the stored document schema (`hattyusha`, `basho`, ...)
/// so existing documents decode without translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(rename = "hattyusha", default)]
    pub client: String,
    #[serde(rename = "basho", default)]
    pub location: String,
    #[serde(rename = "hattyuTantou", default)]
    pub client_contact: String,
    #[serde(rename = "dairininKubun", default)]
    pub representative_category: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub manpower: BTreeMap<NaiveDate, StaffingInfo>,
}

impl Project {
    /// New project with one placeholder task that shares the project id/name.
    pub fn new(id: impl Into<ProjectId>, name: impl Into<String>, today: NaiveDate) -> Self {
        let id = id.into();
        let name = name.into();
        let task = Task::placeholder(id.clone(), name.clone(), today);
        Self {
            id,
            name,
            client: String::new(),
            location: String::new(),
            client_contact: String::new(),
            representative_category: String::new(),
            tasks: vec![task],
            manpower: BTreeMap::new(),
        }
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// Returns whether any task lists `employee_id` as assignee.
    pub fn references_employee(&self, employee_id: &str) -> bool {
        self.tasks.iter().any(|task| task.is_assigned(employee_id))
    }

    /// Checks record invariants before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::BlankId { kind: "project" });
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankField { field: "name" });
        }

        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            task.validate()?;
            if !seen.insert(task.id.as_str()) {
                return Err(ValidationError::DuplicateTaskId {
                    project_id: self.id.clone(),
                    task_id: task.id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Project, StaffingInfo, DEFAULT_WORK_CATEGORY};
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_project_gets_thirty_day_placeholder_task() {
        let project = Project::new("K-100", "県道改良工事", date(2024, 4, 1));
        assert_eq!(project.tasks.len(), 1);
        let task = &project.tasks[0];
        assert_eq!(task.id, "K-100");
        assert_eq!(task.name, "県道改良工事");
        assert_eq!(task.work_category, DEFAULT_WORK_CATEGORY);
        assert_eq!(task.end_date, date(2024, 5, 1));
        assert_eq!(task.progress, 0);
        assert!(task.assigned_to.is_empty());
        assert!(project.manpower.is_empty());
    }

    #[test]
    fn stored_document_uses_legacy_field_names() {
        let mut project = Project::new("K-1", "橋梁補修", date(2024, 1, 10));
        project.client = "山口県".to_string();
        project.manpower.insert(
            date(2024, 1, 11),
            StaffingInfo {
                headcount: 4,
                note: String::new(),
            },
        );
        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["hattyusha"], "山口県");
        assert_eq!(value["tasks"][0]["startDate"], "2024-01-10");
        assert_eq!(value["tasks"][0]["assignedTo"], serde_json::json!([]));
        assert_eq!(value["manpower"]["2024-01-11"]["headcount"], 4);

        let decoded: Project = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, project);
    }

    #[test]
    fn validate_catches_task_invariants() {
        let mut project = Project::new("K-2", "護岸工事", date(2024, 3, 1));
        project.tasks[0].end_date = date(2024, 2, 1);
        assert!(matches!(
            project.validate(),
            Err(ValidationError::InvalidDateRange { .. })
        ));

        let mut project = Project::new("K-2", "護岸工事", date(2024, 3, 1));
        project.tasks[0].progress = 101;
        assert!(matches!(
            project.validate(),
            Err(ValidationError::ProgressOutOfRange { progress: 101, .. })
        ));

        let mut project = Project::new("K-2", "護岸工事", date(2024, 3, 1));
        let duplicate = project.tasks[0].clone();
        project.tasks.push(duplicate);
        assert!(matches!(
            project.validate(),
            Err(ValidationError::DuplicateTaskId { .. })
        ));
    }
}
