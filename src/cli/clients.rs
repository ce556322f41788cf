use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::signed_in;
use crate::clients::{active_count, add_client, get_client, list_clients, profile, search};
use crate::cli::transactions::format_list;
use crate::error::Result;
use crate::models::{Client, ClientStatus, NewClient, Transaction};

pub fn format_clients(clients: &[&Client]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Email", "Company", "Category", "Status"]);
    for c in clients {
        let status = match c.status {
            ClientStatus::Active => c.status.as_str().green(),
            ClientStatus::Inactive => c.status.as_str().dimmed(),
        };
        table.add_row(vec![
            Cell::new(c.id),
            Cell::new(&c.name),
            Cell::new(&c.email),
            Cell::new(&c.company),
            Cell::new(&c.category),
            Cell::new(status),
        ]);
    }
    table.to_string()
}

pub fn list(term: Option<String>) -> Result<()> {
    let ctx = signed_in()?;
    let clients = list_clients(&ctx.conn)?;
    let shown = match term.as_deref() {
        Some(t) => search(&clients, t),
        None => clients.iter().collect(),
    };
    println!("Clients\n{}", format_clients(&shown));
    println!("{} active of {}", active_count(&clients), clients.len());
    Ok(())
}

pub fn add(name: &str, email: &str, company: &str, category: &str, status: &str) -> Result<()> {
    let ctx = signed_in()?;
    let client = NewClient {
        name: name.to_string(),
        email: email.to_string(),
        company: company.to_string(),
        category: category.to_string(),
        status: status.parse()?,
    };
    let id = add_client(&ctx.conn, &client)?;
    println!("Added client #{id}: {name}");
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let ctx = signed_in()?;
    let currency = ctx.settings.currency;
    let report = profile(&ctx.conn, get_client(&ctx.conn, id)?)?;
    let c = &report.client;

    println!("{} ({})", c.name.bold(), c.company);
    println!("Email:     {}", c.email);
    println!("Category:  {}", c.category);
    println!("Status:    {}", c.status.as_str());
    println!();
    if report.transactions.is_empty() {
        println!("No transactions linked to this client.");
    } else {
        let rows: Vec<&Transaction> = report.transactions.iter().collect();
        println!("{}", format_list(&rows, currency, ctx.settings.date_format));
    }
    println!(
        "Income {}  |  Expenses {}  |  Net {}",
        currency.format(report.total_income),
        currency.format(report.total_expenses),
        currency.format(report.net)
    );
    Ok(())
}
