use chrono::{Datelike, Months, NaiveDate};
use rusqlite::Connection;

use crate::cli::{signed_in, today};
use crate::clients::list_clients;
use crate::error::Result;
use crate::models::{NewTransaction, TxnStatus, TxnType};
use crate::store::insert_with_import;

/// Months of history generated, ending with the current month.
const DEMO_MONTHS: u32 = 6;

/// Marks the demo batch in the imports table so it loads once.
const DEMO_CHECKSUM: &str = "runway-demo-data";

struct Recurring {
    day: u32,
    description: &'static str,
    category: &'static str,
    amount: f64,
}

const RECURRING: &[Recurring] = &[
    Recurring { day: 1, description: "Payroll", category: "Payroll", amount: 42000.0 },
    Recurring { day: 2, description: "Office rent", category: "Rent", amount: 8500.0 },
    Recurring { day: 5, description: "AWS", category: "Infrastructure", amount: 3100.0 },
    Recurring { day: 5, description: "GitHub", category: "Software", amount: 420.0 },
    Recurring { day: 8, description: "Slack", category: "Software", amount: 260.0 },
];

/// One-off spend; each month picks two based on its index.
const ROTATING: &[Recurring] = &[
    Recurring { day: 11, description: "LinkedIn ads", category: "Marketing", amount: 2400.0 },
    Recurring { day: 14, description: "Team offsite", category: "Travel", amount: 3600.0 },
    Recurring { day: 16, description: "Laptop", category: "Equipment", amount: 1850.0 },
    Recurring { day: 19, description: "Conference booth", category: "Marketing", amount: 4200.0 },
    Recurring {
        day: 23,
        description: "Legal retainer",
        category: "Professional Services",
        amount: 1500.0,
    },
];

/// Client invoice amounts per month, cycled across the seeded clients.
const INVOICES: &[f64] = &[18000.0, 21500.0, 24000.0, 26500.0, 31000.0, 36500.0];

fn day_in(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    (0..4).find_map(|back| NaiveDate::from_ymd_opt(year, month, day.saturating_sub(back).max(1)))
}

/// Deterministic demo transactions for the `DEMO_MONTHS` months ending at `today`.
/// Nothing is dated after `today`.
pub fn generate(today: NaiveDate, client_ids: &[i64]) -> Vec<NewTransaction> {
    let first = today.with_day(1).unwrap_or(today);
    let mut txns = Vec::new();

    for i in 0..DEMO_MONTHS {
        let Some(start) = first.checked_sub_months(Months::new(DEMO_MONTHS - 1 - i)) else {
            continue;
        };
        let (year, month) = (start.year(), start.month());
        let idx = i as usize;
        let mut push = |day: u32,
                        description: String,
                        category: &str,
                        amount: f64,
                        txn_type: TxnType,
                        client_id: Option<i64>| {
            if let Some(date) = day_in(year, month, day).filter(|d| *d <= today) {
                txns.push(NewTransaction {
                    date,
                    description,
                    amount,
                    txn_type,
                    status: TxnStatus::Completed,
                    category: category.to_string(),
                    client_id,
                });
            }
        };

        if i == 0 {
            push(1, "Seed round".to_string(), "Investment", 500000.0, TxnType::Income, None);
        }
        let invoice = INVOICES[idx % INVOICES.len()];
        let client = (!client_ids.is_empty()).then(|| client_ids[idx % client_ids.len()]);
        push(3, format!("Invoice {:03}", 100 + i), "Revenue", invoice, TxnType::Income, client);
        push(
            20,
            "Subscription payouts".to_string(),
            "Revenue",
            4000.0 + 750.0 * i as f64,
            TxnType::Income,
            None,
        );

        for r in RECURRING {
            // infrastructure grows with usage
            let amount = if r.category == "Infrastructure" {
                r.amount + 150.0 * i as f64
            } else {
                r.amount
            };
            push(r.day, r.description.to_string(), r.category, amount, TxnType::Expense, None);
        }
        for j in 0..2usize {
            let r = &ROTATING[(idx * 2 + j) % ROTATING.len()];
            push(r.day, r.description.to_string(), r.category, r.amount, TxnType::Expense, None);
        }
    }

    // the latest invoice is still outstanding
    if let Some(last) = txns.iter_mut().rev().find(|t| t.description.starts_with("Invoice")) {
        last.status = TxnStatus::Pending;
    }
    txns
}

fn insert_demo_data(conn: &Connection, today: NaiveDate) -> Result<usize> {
    let client_ids: Vec<i64> = list_clients(conn)?.into_iter().map(|c| c.id).collect();
    let txns = generate(today, &client_ids);

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO imports (filename, record_count, checksum) VALUES ('demo', ?1, ?2)",
        rusqlite::params![txns.len() as i64, DEMO_CHECKSUM],
    )?;
    let import_id = tx.last_insert_rowid();
    for txn in &txns {
        insert_with_import(&tx, txn, Some(import_id))?;
    }
    tx.commit()?;
    Ok(txns.len())
}

fn already_loaded(conn: &Connection) -> Result<bool> {
    Ok(conn
        .prepare("SELECT 1 FROM imports WHERE checksum = ?1")?
        .exists([DEMO_CHECKSUM])?)
}

pub fn run() -> Result<()> {
    let ctx = signed_in()?;
    if already_loaded(&ctx.conn)? {
        println!("Demo data already loaded.");
        return Ok(());
    }

    let count = insert_demo_data(&ctx.conn, today())?;
    tracing::info!(count, "loaded demo data");

    println!("Demo data loaded!");
    println!("  Transactions: {count}");
    println!();
    println!("Try these next:");
    println!("  runway dashboard");
    println!("  runway list --range month");
    println!("  runway clients show 1");
    println!("  runway export all");
    Ok(())
}
