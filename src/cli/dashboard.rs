use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};
use rand::seq::SliceRandom;

use crate::alerts::{derive_alerts, Alert, AlertKind};
use crate::auth::get_user;
use crate::cli::{signed_in, today};
use crate::error::Result;
use crate::fmt::{month_label, percent, time_ago, Currency};
use crate::integrations::list_integrations;
use crate::metrics::{derive, monthly_series, Metric, MetricKind, Metrics};
use crate::models::{IntegrationStatus, TxnStatus};
use crate::store::{load_transactions, pending_count};

const GREETINGS: &[&str] = &[
    "Here's where the money went.",
    "Another month, another burn chart.",
    "Cash is a fact. Everything else is an opinion.",
    "Default alive? Let's check.",
    "The runway is only as long as the numbers say.",
    "Good to see you. Your spreadsheet missed you.",
    "Revenue first, then coffee.",
    "Let's see how the month is shaping up.",
];

/// Months of history shown under the metrics grid.
const TREND_MONTHS: u32 = 6;

pub fn format_value(metric: &Metric, currency: Currency) -> String {
    match metric.kind {
        MetricKind::Runway => format!("{:.0} months", metric.current),
        _ => currency.format(metric.current),
    }
}

pub fn format_metrics(metrics: &Metrics, currency: Currency) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Current", "Last month", "Change"]);
    for m in metrics.all() {
        let previous = Metric { current: m.previous, ..m };
        let change = if m.favorable {
            percent(m.change).green()
        } else {
            percent(m.change).red()
        };
        table.add_row(vec![
            Cell::new(m.kind.label().bold()),
            Cell::new(format_value(&m, currency)),
            Cell::new(format_value(&previous, currency)),
            Cell::new(change),
        ]);
    }
    format!("Key metrics\n{table}")
}

pub fn alert_line(alert: &Alert) -> String {
    let label = alert.kind.as_str();
    let tag = match alert.kind {
        AlertKind::Info => label.blue(),
        AlertKind::Warning => label.yellow(),
        AlertKind::Danger => label.red().bold(),
    };
    format!("[{tag}] {}: {}", alert.title.bold(), alert.message)
}

pub fn run(include_pending: bool) -> Result<()> {
    let ctx = signed_in()?;
    let currency = ctx.settings.currency;
    let today = today();
    let now = Local::now().naive_local();

    let user = get_user(&ctx.conn, ctx.session.user_id)?;
    let greeting = GREETINGS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_default();
    println!("{} {greeting}", format!("Hi {}.", user.display_name).bold());
    println!();

    let status = if include_pending {
        None
    } else {
        Some(TxnStatus::Completed)
    };
    let txns = load_transactions(&ctx.conn, status)?;
    let metrics = derive(&txns, today);
    println!("{}", format_metrics(&metrics, currency));

    let mut trend = Table::new();
    trend.set_header(vec!["Month", "Income", "Expenses", "Net"]);
    for flow in monthly_series(&txns, TREND_MONTHS, today) {
        let net = currency.format(flow.net());
        trend.add_row(vec![
            Cell::new(month_label(flow.year, flow.month)),
            Cell::new(currency.format(flow.income)),
            Cell::new(currency.format(flow.expenses)),
            Cell::new(if flow.net() >= 0.0 { net.green() } else { net.red() }),
        ]);
    }
    println!("Last {TREND_MONTHS} months\n{trend}");

    let pending = pending_count(&ctx.conn)?;
    let center = derive_alerts(&metrics, pending, include_pending, now);
    println!();
    println!("Alerts ({} unread)", center.unread_count());
    if center.alerts().is_empty() {
        println!("  Nothing to flag.");
    }
    for alert in center.alerts() {
        println!("  {}", alert_line(alert));
    }

    println!();
    println!("Integrations");
    for i in list_integrations(&ctx.conn)? {
        let status = match i.status {
            IntegrationStatus::Connected => i.status.as_str().green(),
            IntegrationStatus::Error => i.status.as_str().red(),
        };
        println!(
            "  {:<22} {:<16} {:<10} synced {}",
            i.name,
            i.provider,
            status,
            time_ago(i.last_sync, now)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertCenter;
    use crate::models::{Transaction, TxnType};
    use chrono::NaiveDate;

    #[test]
    fn test_format_metrics_lists_all_four() {
        colored::control::set_override(false);
        let txns = vec![Transaction {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            description: "Seed round".to_string(),
            amount: 500000.0,
            txn_type: TxnType::Income,
            status: TxnStatus::Completed,
            category: "Investment".to_string(),
            client_id: None,
        }];
        let m = derive(&txns, NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
        let out = format_metrics(&m, Currency::Inr);
        for label in ["Cash Balance", "Monthly Burn Rate", "Revenue Growth", "Runway"] {
            assert!(out.contains(label), "missing {label} in\n{out}");
        }
        assert!(out.contains("\u{20b9}5,00,000.00"));
        assert!(out.contains("500000 months"));
        assert!(out.contains("+100.0%"));
    }

    #[test]
    fn test_alert_line_tags_kind() {
        colored::control::set_override(false);
        let mut center = AlertCenter::new();
        let now = NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        center.push(AlertKind::Danger, "Runway below 6 months", "3 month(s) left.", now);
        let line = alert_line(&center.alerts()[0]);
        assert_eq!(line, "[danger] Runway below 6 months: 3 month(s) left.");
    }
}
