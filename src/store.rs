use chrono::NaiveDate;
use rusqlite::{Connection, Row};

use crate::error::{Result, RunwayError};
use crate::models::{NewTransaction, Transaction, TxnStatus, TxnType};

const SELECT_COLUMNS: &str =
    "SELECT id, date, description, amount, type, status, category, client_id FROM transactions";

/// Aggregate totals over a loaded transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
    pub cash_balance: f64,
}

pub fn totals(txns: &[Transaction]) -> Totals {
    let income: f64 = txns
        .iter()
        .filter(|t| t.txn_type == TxnType::Income)
        .map(|t| t.amount)
        .sum();
    let expenses: f64 = txns
        .iter()
        .filter(|t| t.txn_type == TxnType::Expense)
        .map(|t| t.amount)
        .sum();
    Totals {
        income,
        expenses,
        cash_balance: income - expenses,
    }
}

pub(crate) fn validate(txn: &NewTransaction) -> Result<()> {
    if !txn.amount.is_finite() || txn.amount < 0.0 {
        return Err(RunwayError::validation(
            "amount",
            format!("{} (must be a non-negative number)", txn.amount),
        ));
    }
    if txn.description.trim().is_empty() {
        return Err(RunwayError::validation("description", "must not be empty"));
    }
    if txn.category.trim().is_empty() {
        return Err(RunwayError::validation("category", "must not be empty"));
    }
    Ok(())
}

pub fn insert_transaction(conn: &Connection, txn: &NewTransaction) -> Result<i64> {
    insert_with_import(conn, txn, None)
}

pub(crate) fn insert_with_import(
    conn: &Connection,
    txn: &NewTransaction,
    import_id: Option<i64>,
) -> Result<i64> {
    validate(txn)?;
    conn.execute(
        "INSERT INTO transactions \
         (date, description, amount, type, status, category, client_id, import_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            txn.date.format("%Y-%m-%d").to_string(),
            txn.description.trim(),
            txn.amount,
            txn.txn_type.as_str(),
            txn.status.as_str(),
            txn.category.trim(),
            txn.client_id,
            import_id,
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(id, kind = txn.txn_type.as_str(), amount = txn.amount, "inserted transaction");
    Ok(id)
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let date: String = row.get(1)?;
    let txn_type: String = row.get(4)?;
    let status: String = row.get(5)?;
    Ok(Transaction {
        id: row.get(0)?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?,
        description: row.get(2)?,
        amount: row.get(3)?,
        txn_type: txn_type.parse().map_err(|e: RunwayError| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?,
        status: status.parse().map_err(|e: RunwayError| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?,
        category: row.get(6)?,
        client_id: row.get(7)?,
    })
}

/// Load transactions, optionally restricted to one status. The list is always
/// fetched whole; callers never merge into a previous result.
pub fn load_transactions(conn: &Connection, status: Option<TxnStatus>) -> Result<Vec<Transaction>> {
    let txns = match status {
        Some(s) => {
            let mut stmt =
                conn.prepare(&format!("{SELECT_COLUMNS} WHERE status = ?1 ORDER BY date, id"))?;
            let rows = stmt.query_map([s.as_str()], row_to_transaction)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY date, id"))?;
            let rows = stmt.query_map([], row_to_transaction)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    tracing::debug!(count = txns.len(), status = ?status, "loaded transactions");
    Ok(txns)
}

pub fn client_transactions(conn: &Connection, client_id: i64) -> Result<Vec<Transaction>> {
    let mut stmt =
        conn.prepare(&format!("{SELECT_COLUMNS} WHERE client_id = ?1 ORDER BY date, id"))?;
    let rows = stmt.query_map([client_id], row_to_transaction)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
    let mut rows = stmt.query_map([id], row_to_transaction)?;
    match rows.next() {
        Some(txn) => Ok(txn?),
        None => Err(RunwayError::NotFound(format!("transaction {id}"))),
    }
}

/// Status is the only field that changes after a transaction is stored.
pub fn set_status(conn: &Connection, id: i64, status: TxnStatus) -> Result<()> {
    let changed = conn.execute(
        "UPDATE transactions SET status = ?1 WHERE id = ?2",
        rusqlite::params![status.as_str(), id],
    )?;
    if changed == 0 {
        return Err(RunwayError::NotFound(format!("transaction {id}")));
    }
    tracing::info!(id, status = status.as_str(), "updated transaction status");
    Ok(())
}

/// Distinct categories in first-seen order.
pub fn categories(txns: &[Transaction]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for t in txns {
        if !seen.contains(&t.category) {
            seen.push(t.category.clone());
        }
    }
    seen
}

pub fn pending_count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT count(*) FROM transactions WHERE status = 'pending'",
        [],
        |r| r.get(0),
    )?)
}

#[cfg(test)]
pub(crate) fn new_txn(
    date: &str,
    description: &str,
    amount: f64,
    txn_type: TxnType,
    category: &str,
) -> NewTransaction {
    NewTransaction {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        description: description.to_string(),
        amount,
        txn_type,
        status: TxnStatus::Completed,
        category: category.to_string(),
        client_id: None,
    }
}
