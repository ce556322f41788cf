use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{Result, RunwayError};
use crate::models::{NewTransaction, TxnStatus};
use crate::store::insert_with_import;

/// One CSV row: `date,description,amount,type,category[,status]`.
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    description: String,
    amount: String,
    #[serde(rename = "type")]
    txn_type: String,
    category: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
}

const CURRENCY_MARKS: [&str; 6] = ["\u{20b9}", "$", "\u{20ac}", "INR", "USD", "EUR"];

/// Strip a currency mark and thousands separators: "₹1,250.00" -> 1250.0.
/// Anything else (exponents, decimal commas, parentheses) is rejected.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut rest = raw.trim();
    let negative = rest.starts_with('-');
    if negative {
        rest = &rest[1..];
    }
    for mark in CURRENCY_MARKS {
        if let Some(stripped) = rest.strip_prefix(mark) {
            rest = stripped.trim_start();
            break;
        }
    }

    let (whole, fraction) = match rest.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (rest, None),
    };
    if !whole.starts_with(|c: char| c.is_ascii_digit())
        || !whole.chars().all(|c| c.is_ascii_digit() || c == ',')
        || whole.contains(",,")
        || whole.ends_with(',')
    {
        return None;
    }
    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }

    let value: f64 = rest.replace(',', "").parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Accepts YYYY-MM-DD, DD/MM/YYYY and MM/DD/YYYY (the latter only when the
/// day/month reading is impossible).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

fn is_duplicate_row(conn: &Connection, txn: &NewTransaction) -> Result<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM transactions \
         WHERE date = ?1 AND description = ?2 AND amount = ?3 AND type = ?4",
    )?;
    Ok(stmt.exists(rusqlite::params![
        txn.date.format("%Y-%m-%d").to_string(),
        txn.description.trim(),
        txn.amount,
        txn.txn_type.as_str(),
    ])?)
}

fn to_new_transaction(row: CsvRow, line: usize) -> Result<NewTransaction> {
    let date = parse_date(&row.date)
        .ok_or_else(|| RunwayError::validation("date", format!("'{}' on line {line}", row.date)))?;
    let amount = parse_amount(&row.amount).ok_or_else(|| {
        RunwayError::validation("amount", format!("'{}' on line {line}", row.amount))
    })?;
    let status = match row.status.as_deref().map(str::trim) {
        None | Some("") => TxnStatus::Completed,
        Some(s) => s.parse()?,
    };
    Ok(NewTransaction {
        date,
        description: row.description,
        amount,
        txn_type: row.txn_type.parse()?,
        status,
        category: row.category,
        client_id: None,
    })
}

pub fn import_file(conn: &Connection, file_path: &Path) -> Result<ImportResult> {
    let checksum = compute_checksum(file_path)?;
    let seen: bool = conn
        .prepare("SELECT 1 FROM imports WHERE checksum = ?1")?
        .exists([&checksum])?;
    if seen {
        return Err(RunwayError::DuplicateImport(file_path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)?;
    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<CsvRow>().enumerate() {
        // header is line 1
        rows.push(to_new_transaction(record?, i + 2)?);
    }

    let tx = conn.unchecked_transaction()?;
    let filename = file_path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();
    tx.execute(
        "INSERT INTO imports (filename, record_count, checksum) VALUES (?1, ?2, ?3)",
        rusqlite::params![filename, rows.len() as i64, checksum],
    )?;
    let import_id = tx.last_insert_rowid();

    let mut result = ImportResult::default();
    for txn in &rows {
        if is_duplicate_row(&tx, txn)? {
            result.skipped += 1;
            continue;
        }
        insert_with_import(&tx, txn, Some(import_id))?;
        result.imported += 1;
    }
    tx.commit()?;

    tracing::info!(
        file = %filename,
        imported = result.imported,
        skipped = result.skipped,
        "imported transactions"
    );
    Ok(result)
}
