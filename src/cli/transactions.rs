use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{signed_in, today};
use crate::clients::get_client;
use crate::error::{Result, RunwayError};
use crate::filter::{parse_category, TransactionFilter};
use crate::fmt::{format_date, Currency, DateFormat};
use crate::models::{NewTransaction, Transaction, TxnStatus, TxnType};
use crate::store::{
    categories, get_transaction, insert_transaction, load_transactions, set_status, totals,
};

pub fn add(
    txn_type: &str,
    amount: f64,
    description: &str,
    category: &str,
    date: Option<String>,
    status: &str,
    client: Option<i64>,
) -> Result<()> {
    let ctx = signed_in()?;
    let date = match date {
        Some(d) => chrono::NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
            .map_err(|_| RunwayError::validation("date", format!("'{d}' (expected YYYY-MM-DD)")))?,
        None => today(),
    };
    if let Some(id) = client {
        get_client(&ctx.conn, id)?;
    }
    let txn = NewTransaction {
        date,
        description: description.trim().to_string(),
        amount,
        txn_type: txn_type.parse()?,
        status: status.parse()?,
        category: category.trim().to_string(),
        client_id: client,
    };
    let id = insert_transaction(&ctx.conn, &txn)?;
    println!(
        "Added {} #{id}: {} {}",
        txn.txn_type,
        txn.description,
        ctx.settings.currency.format(txn.amount)
    );
    Ok(())
}

pub fn format_list(rows: &[&Transaction], currency: Currency, date_format: DateFormat) -> String {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Category", "Status", "Amount"]);
    for t in rows {
        let amount = currency.format(t.signed_amount());
        let amount = match t.txn_type {
            TxnType::Income => amount.green(),
            TxnType::Expense => amount.red(),
        };
        let status = match t.status {
            TxnStatus::Completed => t.status.as_str().normal(),
            TxnStatus::Pending => t.status.as_str().yellow(),
        };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(format_date(t.date, date_format)),
            Cell::new(&t.description),
            Cell::new(&t.category),
            Cell::new(status),
            Cell::new(amount).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

pub fn list(
    search: Option<String>,
    txn_type: &str,
    category: Option<String>,
    range: &str,
    status: Option<String>,
) -> Result<()> {
    let ctx = signed_in()?;
    let status = status.map(|s| s.parse::<TxnStatus>()).transpose()?;
    let filter = TransactionFilter {
        query: search.unwrap_or_default(),
        kind: txn_type.parse()?,
        category: parse_category(category),
        range: range.parse()?,
    };
    let txns = load_transactions(&ctx.conn, status)?;
    let rows = filter.apply(&txns, today());
    if rows.is_empty() {
        println!("No transactions match.");
        return Ok(());
    }

    let currency = ctx.settings.currency;
    println!("{}", format_list(&rows, currency, ctx.settings.date_format));

    let shown: Vec<Transaction> = rows.iter().map(|t| (*t).clone()).collect();
    let t = totals(&shown);
    println!(
        "{} of {} transactions  |  income {}  |  expenses {}  |  net {}",
        rows.len(),
        txns.len(),
        currency.format(t.income),
        currency.format(t.expenses),
        currency.format(t.cash_balance)
    );
    println!("Categories: {}", categories(&txns).join(", "));
    Ok(())
}

pub fn update_status(id: i64, status: &str) -> Result<()> {
    let ctx = signed_in()?;
    let status: TxnStatus = status.parse()?;
    set_status(&ctx.conn, id, status)?;
    let txn = get_transaction(&ctx.conn, id)?;
    println!("#{} {} is now {}.", txn.id, txn.description, txn.status);
    Ok(())
}
