use crate::commands::confirm_delete;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use genba_core::{
    write_export, Collection, CoreConfig, ProjectDraft, ProjectEdit, ProjectService, RosterError,
    RosterResult, SqliteDocumentStore, TaskPatch, TaskUpdateOutcome,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AddCommand {
    /// 工事ID
    id: String,
    /// 工事名 (defaults to 新規工事)
    #[arg(long)]
    name: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditCommand {
    id: String,
    #[arg(long)]
    name: Option<String>,
    /// 発注者
    #[arg(long)]
    client: Option<String>,
    /// 場所
    #[arg(long)]
    location: Option<String>,
    /// 発注担当
    #[arg(long)]
    contact: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteCommand {
    id: String,
    /// Confirmation phrase; prompted for when omitted
    #[arg(long)]
    confirm: Option<String>,
}

#[derive(Args, Debug)]
pub struct SetDatesCommand {
    project: String,
    task: String,
    /// YYYY-MM-DD
    start: NaiveDate,
    /// YYYY-MM-DD
    end: NaiveDate,
}

#[derive(Args, Debug)]
pub struct UpdateTaskCommand {
    project: String,
    task: String,
    #[arg(long)]
    name: Option<String>,
    /// 作業区分
    #[arg(long)]
    category: Option<String>,
    /// 0-100
    #[arg(long)]
    progress: Option<u8>,
    /// Replace the assignees with these employee numbers
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    assign: Option<Vec<String>>,
}

#[derive(Args, Debug)]
pub struct ExportCommand {
    /// Output directory (defaults to GENBA_EXPORT_DIR)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Operation {
    /// Create a project with one default task
    Add(AddCommand),
    /// Change a project's header fields
    Edit(EditCommand),
    /// Delete a project
    Delete(DeleteCommand),
    /// Show projects and their tasks
    List,
    /// Write projects to 工事一覧.csv
    Export(ExportCommand),
    /// Move a task to a new date range
    SetDates(SetDatesCommand),
    /// Change a task's name, category, progress or assignees
    UpdateTask(UpdateTaskCommand),
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
    today: NaiveDate,
) -> RosterResult<()> {
    let service = ProjectService::new(store)?;

    match command.operation {
        Operation::Add(add) => {
            let project = service.add(
                ProjectDraft {
                    id: add.id,
                    name: add.name.unwrap_or_default(),
                },
                today,
            )?;
            println!("Added {} {}", project.id, project.name);
        }
        Operation::Edit(edit) => {
            let projects = service.projects();
            let current = projects
                .get(&edit.id)
                .ok_or_else(|| RosterError::NotFound {
                    collection: Collection::Projects,
                    id: edit.id.clone(),
                })?;
            let mut changes = ProjectEdit::from_current(current);
            if let Some(name) = edit.name {
                changes.name = name;
            }
            if let Some(client) = edit.client {
                changes.client = client;
            }
            if let Some(location) = edit.location {
                changes.location = location;
            }
            if let Some(contact) = edit.contact {
                changes.client_contact = contact;
            }
            let project = service.edit(&edit.id, changes)?;
            println!("Updated {} {}", project.id, project.name);
        }
        Operation::Delete(delete) => {
            let confirmation = confirm_delete(&delete.id, delete.confirm)?;
            service.delete(&delete.id, confirmation)?;
            println!("Deleted {}", delete.id);
        }
        Operation::List => {
            let projects = service.projects();
            if projects.is_empty() {
                println!("No projects registered.");
            }
            for project in projects.records() {
                println!("{}\t{}\t{}\t{}", project.id, project.name, project.client, project.location);
                for task in &project.tasks {
                    let assignees: Vec<&str> = task.assigned_to.iter().map(String::as_str).collect();
                    println!(
                        "  {}\t{}\t{} - {}\t{}%\t{}",
                        task.id,
                        task.name,
                        task.start_date,
                        task.end_date,
                        task.progress,
                        assignees.join(" ")
                    );
                }
            }
        }
        Operation::Export(export) => {
            let csv = service.export()?;
            let dir = export.out.unwrap_or_else(|| config.export_dir.clone());
            let path = write_export(&dir, &csv)?;
            println!("Wrote {} row(s) to {}", csv.row_count, path.display());
        }
        Operation::SetDates(dates) => {
            let outcome =
                service.update_task_dates(&dates.project, &dates.task, dates.start, dates.end)?;
            report_task_outcome(&dates.project, &dates.task, &outcome);
        }
        Operation::UpdateTask(update) => {
            let patch = TaskPatch {
                name: update.name,
                work_category: update.category,
                progress: update.progress,
                assigned_to: update
                    .assign
                    .map(|ids| ids.into_iter().filter(|id| !id.is_empty()).collect()),
                ..TaskPatch::default()
            };
            let outcome = service.update_task(&update.project, &update.task, &patch)?;
            report_task_outcome(&update.project, &update.task, &outcome);
        }
    }
    Ok(())
}

fn report_task_outcome(project_id: &str, task_id: &str, outcome: &TaskUpdateOutcome) {
    match outcome {
        TaskUpdateOutcome::Applied(_) => println!("Updated {project_id}/{task_id}"),
        TaskUpdateOutcome::ProjectNotFound => {
            eprintln!("warning: project {project_id} not found; nothing changed")
        }
        TaskUpdateOutcome::TaskNotFound => {
            eprintln!("warning: task {task_id} not found in {project_id}; nothing changed")
        }
    }
}
