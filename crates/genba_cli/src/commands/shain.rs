use crate::commands::confirm_delete;
use clap::{Args, Subcommand};
use genba_core::{
    write_export, Collection, CoreConfig, EmployeeDraft, EmployeeEdit, RosterError, RosterResult,
    ShainService, SqliteDocumentStore,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AddCommand {
    /// 社員番号
    number: String,
    /// 姓
    #[arg(long)]
    family: String,
    /// 名
    #[arg(long)]
    given: String,
    #[arg(long)]
    office: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditCommand {
    number: String,
    #[arg(long)]
    family: Option<String>,
    #[arg(long)]
    given: Option<String>,
    #[arg(long)]
    office: Option<String>,
    #[arg(long)]
    department: Option<String>,
    /// Empty string clears the address
    #[arg(long)]
    email: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteCommand {
    number: String,
    /// Confirmation phrase; prompted for when omitted
    #[arg(long)]
    confirm: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExportCommand {
    /// Output directory (defaults to GENBA_EXPORT_DIR)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Operation {
    /// Register a new employee
    Add(AddCommand),
    /// Change an employee's details
    Edit(EditCommand),
    /// Delete an employee and unassign them from every task
    Delete(DeleteCommand),
    /// Show the roster
    List,
    /// Write the roster to 社員名簿.csv
    Export(ExportCommand),
}

#[derive(Args, Debug)]
pub struct Command {
    #[command(subcommand)]
    operation: Operation,
}

pub fn handle(
    command: Command,
    store: &SqliteDocumentStore<'_>,
    config: &CoreConfig,
) -> RosterResult<()> {
    let service = ShainService::new(store)?;

    match command.operation {
        Operation::Add(add) => {
            let employee = service.add(EmployeeDraft {
                employee_number: add.number,
                family_name: add.family,
                given_name: add.given,
                office: add.office.unwrap_or_default(),
                department: add.department.unwrap_or_default(),
                email: add.email.unwrap_or_default(),
            })?;
            println!("Added {} {}", employee.id(), employee.full_name());
        }
        Operation::Edit(edit) => {
            let roster = service.employees();
            let current = roster
                .get(&edit.number)
                .ok_or_else(|| RosterError::NotFound {
                    collection: Collection::Shain,
                    id: edit.number.clone(),
                })?;
            let mut changes = EmployeeEdit::from_current(current);
            if let Some(family) = edit.family {
                changes.family_name = family;
            }
            if let Some(given) = edit.given {
                changes.given_name = given;
            }
            if let Some(office) = edit.office {
                changes.office = office;
            }
            if let Some(department) = edit.department {
                changes.department = department;
            }
            if let Some(email) = edit.email {
                changes.email = email;
            }
            let employee = service.edit(&edit.number, changes)?;
            println!("Updated {} {}", employee.id(), employee.full_name());
        }
        Operation::Delete(delete) => {
            let confirmation = confirm_delete(&delete.number, delete.confirm)?;
            let report = service.delete(&delete.number, confirmation)?;
            println!(
                "Deleted {}; unassigned from {} project(s).",
                report.employee_id,
                report.updated_projects.len()
            );
        }
        Operation::List => {
            let roster = service.employees();
            if roster.is_empty() {
                println!("No employees registered.");
            }
            for employee in roster.records() {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    employee.id(),
                    employee.full_name(),
                    employee.office,
                    employee.department,
                    employee.email
                );
            }
            for (project_id, employee_id) in service.dangling_assignments() {
                eprintln!("warning: {project_id} still assigns unknown employee {employee_id}");
            }
        }
        Operation::Export(export) => {
            let csv = service.export()?;
            let dir = export.out.unwrap_or_else(|| config.export_dir.clone());
            let path = write_export(&dir, &csv)?;
            println!("Wrote {} row(s) to {}", csv.row_count, path.display());
        }
    }
    Ok(())
}
