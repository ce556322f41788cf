use chrono::Local;

use crate::alerts::derive_alerts;
use crate::cli::dashboard::alert_line;
use crate::cli::{signed_in, today};
use crate::error::Result;
use crate::fmt::time_ago;
use crate::metrics::derive;
use crate::models::TxnStatus;
use crate::store::{load_transactions, pending_count};

pub fn run() -> Result<()> {
    let ctx = signed_in()?;
    let now = Local::now().naive_local();
    let txns = load_transactions(&ctx.conn, Some(TxnStatus::Completed))?;
    let metrics = derive(&txns, today());
    let center = derive_alerts(&metrics, pending_count(&ctx.conn)?, false, now);

    if center.alerts().is_empty() {
        println!("No alerts.");
        return Ok(());
    }
    println!("{} alert(s), {} unread", center.alerts().len(), center.unread_count());
    for alert in center.alerts() {
        println!("{}  ({})", alert_line(alert), time_ago(alert.timestamp, now));
    }
    Ok(())
}
