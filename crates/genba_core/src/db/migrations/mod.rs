//! Schema migrations for the document store tables.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Migrations shape the storage tables only; document bodies are opaque
//!   JSON and are never rewritten here.
//! - After a successful run the `store_version` singleton row exists.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "documents_and_store_version",
    sql: include_str!("0001_init.sql"),
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies pending migrations in one transaction, then checks that the
/// store-wide version row is present.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    if from < latest {
        let tx = conn.transaction()?;
        for migration in MIGRATIONS.iter().filter(|migration| migration.version > from) {
            run_migration(&tx, migration)?;
        }
        tx.commit()?;
    }

    ensure_store_version_row(conn)
}

fn run_migration(tx: &Transaction<'_>, migration: &Migration) -> DbResult<()> {
    let failed = |source| DbError::Migration {
        version: migration.version,
        name: migration.name,
        source,
    };
    tx.execute_batch(migration.sql).map_err(failed)?;
    tx.pragma_update(None, "user_version", migration.version)
        .map_err(failed)?;
    info!(
        "event=db_migrate module=db status=ok version={} name={}",
        migration.version, migration.name
    );
    Ok(())
}

fn ensure_store_version_row(conn: &Connection) -> DbResult<()> {
    let rows: i64 = conn.query_row(
        "SELECT COUNT(*) FROM store_version WHERE id = 1;",
        [],
        |row| row.get(0),
    )?;
    if rows == 1 {
        Ok(())
    } else {
        Err(DbError::MissingStoreVersion)
    }
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
