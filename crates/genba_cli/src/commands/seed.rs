use chrono::NaiveDate;
use clap::Args;
use genba_core::{RosterResult, SeedService, SeedSource, SqliteDocumentStore};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct Command {
    /// Projects sheet (工事ID, 工事名, ...)
    #[arg(long, requires = "shain")]
    kouji: Option<PathBuf>,
    /// Roster sheet (社員番号, 姓, 名, ...)
    #[arg(long, requires = "kouji")]
    shain: Option<PathBuf>,
    /// Work-history sheet (工事ID, 社員番号, 作業ID)
    #[arg(long, requires = "kouji")]
    keireki: Option<PathBuf>,
}

pub fn handle(
    command: Command,
    store: &SqliteDocumentStore<'_>,
    today: NaiveDate,
) -> RosterResult<()> {
    let source = match (&command.kouji, &command.shain) {
        (Some(kouji), Some(shain)) => {
            SeedSource::from_files(kouji, shain, command.keireki.as_deref())?
        }
        _ => SeedSource::bundled(),
    };

    let report = SeedService::new(store).seed(&source, today)?;
    println!(
        "Seeded {} project(s) and {} employee(s).",
        report.projects, report.employees
    );
    Ok(())
}
