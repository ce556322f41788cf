use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::TS_FORMAT;
use crate::error::{Result, RunwayError};
use crate::models::Integration;

fn conversion_error(
    column: usize,
    err: Box<dyn std::error::Error + Send + Sync + 'static>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, err)
}

pub fn list_integrations(conn: &Connection) -> Result<Vec<Integration>> {
    let mut stmt =
        conn.prepare("SELECT id, name, provider, status, last_sync FROM integrations ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        let status: String = row.get(3)?;
        let last_sync: String = row.get(4)?;
        Ok(Integration {
            id: row.get(0)?,
            name: row.get(1)?,
            provider: row.get(2)?,
            status: status
                .parse()
                .map_err(|e: RunwayError| conversion_error(3, Box::new(e)))?,
            last_sync: NaiveDateTime::parse_from_str(&last_sync, TS_FORMAT)
                .map_err(|e| conversion_error(4, Box::new(e)))?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Refresh every integration's last-sync time. Status is left as it was;
/// there is no remote to reconnect to.
pub fn sync_all(conn: &Connection, now: NaiveDateTime) -> Result<usize> {
    let updated = conn.execute(
        "UPDATE integrations SET last_sync = ?1",
        [now.format(TS_FORMAT).to_string()],
    )?;
    tracing::info!(updated, "synced integrations");
    Ok(updated)
}
