use anyhow::{bail, Context, Result};
use rusqlite::Connection;

use crate::log_info;

const ENABLE_LOGS: bool = true;

/// Schema scripts in order; entry `n` upgrades `user_version` from `n` to `n + 1`.
const MIGRATIONS: &[(&str, &str)] = &[(
    "schema_v1.sql",
    include_str!("schemas/schema_v1.sql"),
)];

const CURRENT_SCHEMA_VERSION: i32 = MIGRATIONS.len() as i32;

fn schema_version(conn: &Connection) -> Result<i32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")
}

/// Bring the schema up to date in one transaction.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let found = schema_version(conn)?;
    match found {
        v if v > CURRENT_SCHEMA_VERSION => bail!(
            "database schema v{v} is newer than this build understands (v{CURRENT_SCHEMA_VERSION})"
        ),
        v if v == CURRENT_SCHEMA_VERSION => return Ok(()),
        v if v < 0 => bail!("database reports negative schema version {v}"),
        _ => {}
    }

    let tx = conn
        .transaction()
        .context("failed to start schema upgrade")?;

    for (index, (name, script)) in MIGRATIONS.iter().enumerate().skip(found as usize) {
        tx.execute_batch(script)
            .with_context(|| format!("failed to apply {name}"))?;
        log_info!("Applied {name} (schema v{})", index + 1);
    }

    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
        .context("failed to record schema version")?;
    tx.commit().context("failed to commit schema upgrade")
}
