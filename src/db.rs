use std::path::Path;

use chrono::{Duration, Local};
use rusqlite::Connection;

use crate::error::Result;

pub const DB_FILE: &str = "runway.db";

/// Timestamp format used for every TEXT datetime column.
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS clients (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    company TEXT NOT NULL,
    category TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'active',
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    record_count INTEGER,
    checksum TEXT
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    amount REAL NOT NULL CHECK (amount >= 0),
    type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
    status TEXT NOT NULL DEFAULT 'completed' CHECK (status IN ('completed', 'pending')),
    category TEXT NOT NULL,
    client_id INTEGER,
    import_id INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (client_id) REFERENCES clients(id),
    FOREIGN KEY (import_id) REFERENCES imports(id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_status ON transactions(status);
CREATE INDEX IF NOT EXISTS idx_transactions_client ON transactions(client_id);

CREATE TABLE IF NOT EXISTS integrations (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    provider TEXT NOT NULL,
    status TEXT NOT NULL,
    last_sync TEXT NOT NULL
);
";

// (name, email, company, category)
const DEFAULT_CLIENTS: &[(&str, &str, &str, &str)] = &[
    ("Maya Patel", "maya@techcorp.example", "TechCorp Inc.", "Technology"),
    ("Jonas Weber", "jonas@designsolutions.example", "Design Solutions", "Design"),
    ("Priya Nair", "priya@marketingpro.example", "Marketing Pro", "Marketing"),
    ("Leo Okafor", "leo@financeanalytics.example", "Finance Analytics", "Finance"),
];

// (name, provider, status, minutes since last sync)
const DEFAULT_INTEGRATIONS: &[(&str, &str, &str, i64)] = &[
    ("Bank Account", "Chase Business", "connected", 2),
    ("Payment Gateway", "Stripe", "connected", 5),
    ("Accounting Software", "QuickBooks", "error", 60),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    tracing::debug!(path = %db_path.display(), "opening database");
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let clients: i64 = conn.query_row("SELECT count(*) FROM clients", [], |row| row.get(0))?;
    if clients == 0 {
        for c in DEFAULT_CLIENTS {
            conn.execute(
                "INSERT INTO clients (name, email, company, category, status) \
                 VALUES (?1, ?2, ?3, ?4, 'active')",
                rusqlite::params![c.0, c.1, c.2, c.3],
            )?;
        }
        tracing::info!(count = DEFAULT_CLIENTS.len(), "seeded client roster");
    }

    let integrations: i64 =
        conn.query_row("SELECT count(*) FROM integrations", [], |row| row.get(0))?;
    if integrations == 0 {
        let now = Local::now().naive_local();
        for i in DEFAULT_INTEGRATIONS {
            let last_sync = (now - Duration::minutes(i.3)).format(TS_FORMAT).to_string();
            conn.execute(
                "INSERT INTO integrations (name, provider, status, last_sync) \
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![i.0, i.1, i.2, last_sync],
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = get_connection(&dir.path().join("test.db")).unwrap();
    init_db(&conn).unwrap();
    (dir, conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            )
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["users", "clients", "imports", "transactions", "integrations"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
        let clients: i64 = conn
            .query_row("SELECT count(*) FROM clients", [], |r| r.get(0))
            .unwrap();
        assert_eq!(clients, 4);
        let integrations: i64 =
            conn.query_row("SELECT count(*) FROM integrations", [], |r| r.get(0)).unwrap();
        assert_eq!(integrations, 3);
    }

    #[test]
    fn test_negative_amount_rejected_by_schema() {
        let (_dir, conn) = test_db();
        let result = conn.execute(
            "INSERT INTO transactions (date, description, amount, type, category) \
             VALUES ('2024-05-01', 'Bad', -1.0, 'income', 'Revenue')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_client_rejected_by_foreign_key() {
        let (_dir, conn) = test_db();
        let result = conn.execute(
            "INSERT INTO transactions (date, description, amount, type, category, client_id) \
             VALUES ('2024-05-01', 'Retainer', 10.0, 'income', 'Revenue', 999)",
            [],
        );
        assert!(result.is_err());
    }
}
