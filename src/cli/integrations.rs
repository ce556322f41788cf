use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::signed_in;
use crate::error::Result;
use crate::fmt::time_ago;
use crate::integrations::{list_integrations, sync_all};
use crate::models::IntegrationStatus;

pub fn list() -> Result<()> {
    let ctx = signed_in()?;
    let now = Local::now().naive_local();
    let mut table = Table::new();
    table.set_header(vec!["Name", "Provider", "Status", "Last sync"]);
    for i in list_integrations(&ctx.conn)? {
        let status = match i.status {
            IntegrationStatus::Connected => i.status.as_str().green(),
            IntegrationStatus::Error => i.status.as_str().red(),
        };
        table.add_row(vec![
            Cell::new(&i.name),
            Cell::new(&i.provider),
            Cell::new(status),
            Cell::new(time_ago(i.last_sync, now)),
        ]);
    }
    println!("Integrations\n{table}");
    Ok(())
}

pub fn sync() -> Result<()> {
    let ctx = signed_in()?;
    let count = sync_all(&ctx.conn, Local::now().naive_local())?;
    println!("Synced {count} integration(s).");
    Ok(())
}
