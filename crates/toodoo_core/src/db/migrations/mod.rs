//! Ordered schema migrations for the key-value database.
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - Pending migrations run inside one transaction; a failure leaves the
//!   previous `user_version` in place.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_kv_entries.sql"),
}];

/// Latest schema version this build can write.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = user_version(conn)?;
    let supported = latest_version();

    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }
    if found == supported {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > found) {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        found, supported
    );
    Ok(())
}

/// Reads `PRAGMA user_version`.
pub fn user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}
