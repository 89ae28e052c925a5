//! `genba` command-line entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and open the store.
//! - Dispatch one subcommand and map failures to user notices.

use chrono::Local;
use clap::Parser;
use genba_core::db::open_db;
use genba_core::{init_logging, CoreConfig, RosterError, SqliteDocumentStore, StoreError};
use std::process::ExitCode;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "genba",
    version,
    about = "Roster and construction project tracker"
)]
struct Args {
    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("genba: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("genba: logging disabled: {err}");
        }
    }

    match run(args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.user_notice());
            log::debug!("event=cli_exit module=cli status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args, config: &CoreConfig) -> Result<(), RosterError> {
    let conn = open_db(&config.db_path).map_err(StoreError::from)?;
    let store = SqliteDocumentStore::try_new(&conn)?;
    let today = Local::now().date_naive();
    args.command.execute(&store, config, today)
}
