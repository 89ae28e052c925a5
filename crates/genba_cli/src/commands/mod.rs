use chrono::NaiveDate;
use clap::Subcommand;
use genba_core::{CoreConfig, DeleteConfirmation, RosterResult, SqliteDocumentStore};
use std::io::{self, BufRead, Write};

pub mod project;
pub mod seed;
pub mod shain;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Populate an empty store from CSV sheets (bundled sample by default)
    Seed(seed::Command),
    /// Manage the employee roster
    Shain(shain::Command),
    /// Manage construction projects and their tasks
    Project(project::Command),
}

impl Command {
    pub fn execute(
        self,
        store: &SqliteDocumentStore<'_>,
        config: &CoreConfig,
        today: NaiveDate,
    ) -> RosterResult<()> {
        match self {
            Self::Seed(o) => seed::handle(o, store, today),
            Self::Shain(o) => shain::handle(o, store, config),
            Self::Project(o) => project::handle(o, store, config, today),
        }
    }
}

/// Confirmation from `--confirm`, or typed on stdin when the flag is absent.
pub(crate) fn confirm_delete(
    target: &str,
    confirm: Option<String>,
) -> RosterResult<DeleteConfirmation> {
    let phrase = match confirm {
        Some(phrase) => phrase,
        None => {
            print!("{target} を削除します。確認のため DELETE と入力してください: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    DeleteConfirmation::parse(&phrase)
}
