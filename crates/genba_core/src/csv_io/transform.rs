//! Flat sheets -> structured `Project` / `Employee` records.
//!
//! # Responsibility
//! - Group projects-sheet rows by 工事ID into one `Project` with one task per
//!   row.
//! - Join work-history rows onto task assignments.
//!
//! # Invariants
//! - Exactly one `Project` per distinct non-blank 工事ID, in first-seen order.
//! - A project's task count equals the number of its projects-sheet rows.
//! - Task ids are unique within a project. A generated id never takes an id
//!   that another row of the same project names explicitly.
//! - Work-history rows naming an unknown project, employee or task are
//!   skipped without error.
//! - Assignments only ever reference employees present in the roster sheet.

use crate::csv_io::codec::{parse_csv, CsvRow};
use crate::csv_io::{keireki_columns, kouji_columns, shain_columns};
use crate::model::employee::{Employee, EmployeeId};
use crate::model::project::{Project, ProjectId, Task, TaskId, DEFAULT_WORK_CATEGORY};
use chrono::NaiveDate;
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SHEET_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A required column is absent from a non-empty sheet.
    MissingColumn {
        sheet: &'static str,
        column: &'static str,
    },
    /// `line` is the 1-based line in the sheet, header included.
    InvalidDate {
        line: usize,
        column: &'static str,
        value: String,
    },
    InvalidProgress { line: usize, value: String },
    /// A 作業ID repeats an earlier row of the same project.
    DuplicateTaskId { line: usize, task_id: String },
}

impl Display for TransformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn { sheet, column } => {
                write!(f, "{sheet} sheet is missing column `{column}`")
            }
            Self::InvalidDate {
                line,
                column,
                value,
            } => write!(f, "line {line}: `{value}` in {column} is not a date"),
            Self::InvalidProgress { line, value } => {
                write!(f, "line {line}: progress `{value}` is not a percentage")
            }
            Self::DuplicateTaskId { line, task_id } => {
                write!(f, "line {line}: task id `{task_id}` is already used in this project")
            }
        }
    }
}

impl Error for TransformError {}

/// Reads roster rows with a non-blank 社員番号 into employees.
pub fn employees_from_csv(shain_csv: &str) -> Vec<Employee> {
    employees_from_rows(&parse_csv(shain_csv))
}

pub fn employees_from_rows(rows: &[CsvRow]) -> Vec<Employee> {
    rows.iter()
        .filter(|row| !row.value(shain_columns::EMPLOYEE_NUMBER).is_empty())
        .map(|row| Employee {
            employee_number: row.value(shain_columns::EMPLOYEE_NUMBER).to_string(),
            family_name: row.value(shain_columns::FAMILY_NAME).to_string(),
            given_name: row.value(shain_columns::GIVEN_NAME).to_string(),
            office: row.value(shain_columns::OFFICE).to_string(),
            department: row.value(shain_columns::DEPARTMENT).to_string(),
            email: row.value(shain_columns::EMAIL).to_string(),
        })
        .collect()
}

/// Rebuilds projects from the projects, roster and work-history sheets.
///
/// `today` fills a blank start date; a blank end date falls back to the
/// start date.
pub fn transform_csv_to_projects(
    kouji_csv: &str,
    shain_csv: &str,
    keireki_csv: &str,
    today: NaiveDate,
) -> Result<Vec<Project>, TransformError> {
    let known_employees: HashSet<EmployeeId> = employees_from_csv(shain_csv)
        .into_iter()
        .map(|employee| employee.employee_number)
        .collect();

    let kouji_rows = parse_csv(kouji_csv);
    if let Some(first) = kouji_rows.first() {
        if first.get(kouji_columns::PROJECT_ID).is_none() {
            return Err(TransformError::MissingColumn {
                sheet: "kouji",
                column: kouji_columns::PROJECT_ID,
            });
        }
    }

    let explicit_task_ids = explicit_task_ids(&kouji_rows);
    let no_reserved_ids = HashSet::new();
    let mut projects: Vec<Project> = Vec::new();
    let mut positions: HashMap<ProjectId, usize> = HashMap::new();

    for (index, row) in kouji_rows.iter().enumerate() {
        let line = index + 2;
        let project_id = row.value(kouji_columns::PROJECT_ID);
        if project_id.is_empty() {
            debug!("event=csv_transform module=csv status=skipped sheet=kouji line={line} reason=blank_project_id");
            continue;
        }

        let position = *positions
            .entry(project_id.to_string())
            .or_insert_with(|| {
                projects.push(project_from_row(row));
                projects.len() - 1
            });
        let project = &mut projects[position];
        let reserved = explicit_task_ids.get(project_id).unwrap_or(&no_reserved_ids);
        let task = task_from_row(row, project, reserved, line, today, &known_employees)?;
        project.tasks.push(task);
    }

    let mut skipped = 0usize;
    for (index, row) in parse_csv(keireki_csv).iter().enumerate() {
        if !apply_work_history(row, &mut projects, &positions, &known_employees) {
            skipped += 1;
            debug!(
                "event=csv_transform module=csv status=skipped sheet=keireki line={} reason=stale_reference",
                index + 2
            );
        }
    }

    debug!(
        "event=csv_transform module=csv status=ok projects={} skipped_history_rows={skipped}",
        projects.len()
    );
    Ok(projects)
}

fn project_from_row(row: &CsvRow) -> Project {
    Project {
        id: row.value(kouji_columns::PROJECT_ID).to_string(),
        name: row.value(kouji_columns::PROJECT_NAME).to_string(),
        client: row.value(kouji_columns::CLIENT).to_string(),
        location: row.value(kouji_columns::LOCATION).to_string(),
        client_contact: row.value(kouji_columns::CLIENT_CONTACT).to_string(),
        representative_category: row.value(kouji_columns::REPRESENTATIVE_CATEGORY).to_string(),
        tasks: Vec::new(),
        manpower: BTreeMap::new(),
    }
}

/// Collects the non-blank 作業ID values of every project.
fn explicit_task_ids(rows: &[CsvRow]) -> HashMap<&str, HashSet<&str>> {
    let mut ids: HashMap<&str, HashSet<&str>> = HashMap::new();
    for row in rows {
        let project_id = row.value(kouji_columns::PROJECT_ID);
        let task_id = row.value(kouji_columns::TASK_ID);
        if !project_id.is_empty() && !task_id.is_empty() {
            ids.entry(project_id).or_default().insert(task_id);
        }
    }
    ids
}

/// First free id for a row without 作業ID: the project id for the first
/// task, then `<project>-<n>` counting from the task's position.
fn generated_task_id(project: &Project, reserved: &HashSet<&str>) -> TaskId {
    let taken = |candidate: &str| {
        reserved.contains(candidate) || project.tasks.iter().any(|task| task.id == candidate)
    };
    if project.tasks.is_empty() && !taken(&project.id) {
        return project.id.clone();
    }
    let mut n = project.tasks.len() + 1;
    loop {
        let candidate = format!("{}-{n}", project.id);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn task_from_row(
    row: &CsvRow,
    project: &Project,
    reserved: &HashSet<&str>,
    line: usize,
    today: NaiveDate,
    known_employees: &HashSet<EmployeeId>,
) -> Result<Task, TransformError> {
    let id = match row.value(kouji_columns::TASK_ID) {
        "" => generated_task_id(project, reserved),
        explicit if project.tasks.iter().any(|task| task.id == explicit) => {
            return Err(TransformError::DuplicateTaskId {
                line,
                task_id: explicit.to_string(),
            });
        }
        explicit => explicit.to_string(),
    };
    let name = match row.value(kouji_columns::TASK_NAME) {
        "" => project.name.clone(),
        name => name.to_string(),
    };
    let work_category = match row.value(kouji_columns::WORK_CATEGORY) {
        "" => DEFAULT_WORK_CATEGORY.to_string(),
        category => category.to_string(),
    };

    let start_date = parse_sheet_date(row, kouji_columns::START_DATE, line)?.unwrap_or(today);
    let end_date = parse_sheet_date(row, kouji_columns::END_DATE, line)?.unwrap_or(start_date);
    let progress = parse_progress(row.value(kouji_columns::PROGRESS), line)?;

    let assigned_to: BTreeSet<EmployeeId> = row
        .value(kouji_columns::ASSIGNEES)
        .split_whitespace()
        .filter(|employee_id| known_employees.contains(*employee_id))
        .map(str::to_string)
        .collect();

    Ok(Task {
        id,
        name,
        work_category,
        start_date,
        end_date,
        progress,
        assigned_to,
    })
}

/// Returns `false` when the row references data absent from the other sheets.
fn apply_work_history(
    row: &CsvRow,
    projects: &mut [Project],
    positions: &HashMap<ProjectId, usize>,
    known_employees: &HashSet<EmployeeId>,
) -> bool {
    let employee_id = row.value(keireki_columns::EMPLOYEE_NUMBER);
    if !known_employees.contains(employee_id) {
        return false;
    }
    let Some(&position) = positions.get(row.value(keireki_columns::PROJECT_ID)) else {
        return false;
    };
    let project = &mut projects[position];

    match row.value(keireki_columns::TASK_ID) {
        "" => {
            for task in &mut project.tasks {
                task.assigned_to.insert(employee_id.to_string());
            }
            true
        }
        task_id => match project.tasks.iter_mut().find(|task| task.id == task_id) {
            Some(task) => {
                task.assigned_to.insert(employee_id.to_string());
                true
            }
            None => false,
        },
    }
}

fn parse_sheet_date(
    row: &CsvRow,
    column: &'static str,
    line: usize,
) -> Result<Option<NaiveDate>, TransformError> {
    let value = row.value(column);
    if value.is_empty() {
        return Ok(None);
    }
    SHEET_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .map(Some)
        .ok_or_else(|| TransformError::InvalidDate {
            line,
            column,
            value: value.to_string(),
        })
}

fn parse_progress(value: &str, line: usize) -> Result<u8, TransformError> {
    let digits = value.trim_end_matches('%').trim();
    if digits.is_empty() {
        return Ok(0);
    }
    digits
        .parse::<u8>()
        .ok()
        .filter(|progress| *progress <= 100)
        .ok_or_else(|| TransformError::InvalidProgress {
            line,
            value: value.to_string(),
        })
}
