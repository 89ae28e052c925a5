//! Collection snapshots -> downloadable CSV files.

use crate::csv_io::codec::serialize_csv;
use crate::csv_io::{kouji_columns, shain_columns};
use crate::error::{RosterError, RosterResult};
use crate::model::employee::Employee;
use crate::model::project::Project;
use crate::store::Collection;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed file name of the roster export.
pub const EMPLOYEE_EXPORT_FILE_NAME: &str = "社員名簿.csv";
pub const PROJECT_EXPORT_FILE_NAME: &str = "工事一覧.csv";

/// Serialized export ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: &'static str,
    pub content: String,
    pub row_count: usize,
}

/// Exports the roster; refuses an empty roster with `EmptyExport`.
pub fn export_employees(employees: &[Employee]) -> RosterResult<CsvExport> {
    if employees.is_empty() {
        return Err(RosterError::EmptyExport {
            collection: Collection::Shain,
        });
    }

    let rows: Vec<Vec<&str>> = employees
        .iter()
        .map(|employee| {
            vec![
                employee.employee_number.as_str(),
                employee.family_name.as_str(),
                employee.given_name.as_str(),
                employee.office.as_str(),
                employee.department.as_str(),
                employee.email.as_str(),
            ]
        })
        .collect();

    Ok(CsvExport {
        file_name: EMPLOYEE_EXPORT_FILE_NAME,
        content: serialize_csv(&shain_columns::ALL, &rows)?,
        row_count: rows.len(),
    })
}

/// Exports projects in the projects-sheet layout, one row per task.
///
/// The output re-imports through `transform_csv_to_projects`.
pub fn export_projects(projects: &[Project]) -> RosterResult<CsvExport> {
    if projects.is_empty() {
        return Err(RosterError::EmptyExport {
            collection: Collection::Projects,
        });
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for project in projects {
        for task in &project.tasks {
            rows.push(vec![
                project.id.clone(),
                project.name.clone(),
                project.client.clone(),
                project.location.clone(),
                project.client_contact.clone(),
                project.representative_category.clone(),
                task.id.clone(),
                task.name.clone(),
                task.work_category.clone(),
                task.start_date.to_string(),
                task.end_date.to_string(),
                task.progress.to_string(),
                task.assigned_to
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
            ]);
        }
    }

    Ok(CsvExport {
        file_name: PROJECT_EXPORT_FILE_NAME,
        content: serialize_csv(&kouji_columns::ALL, &rows)?,
        row_count: rows.len(),
    })
}

/// Writes `export` into `dir` under its fixed file name.
pub fn write_export(dir: &Path, export: &CsvExport) -> RosterResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export.file_name);
    fs::write(&path, export.content.as_bytes())?;
    info!(
        "event=csv_export module=csv status=ok file={} rows={}",
        export.file_name, export.row_count
    );
    Ok(path)
}
