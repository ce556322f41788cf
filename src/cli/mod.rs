pub mod alerts;
pub mod auth;
pub mod clients;
pub mod config;
pub mod dashboard;
pub mod demo;
#[cfg(feature = "pdf")]
pub mod export;
pub mod import;
pub mod init;
pub mod integrations;
pub mod status;
pub mod transactions;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{Result, RunwayError};
use crate::settings::{db_path, load_settings, require_session, Session, Settings};

/// Everything a data command needs: settings, the signed-in session and an open database.
pub(crate) struct Ctx {
    pub settings: Settings,
    pub session: Session,
    pub conn: Connection,
}

pub(crate) fn open_db() -> Result<Connection> {
    let path = db_path();
    if !path.exists() {
        return Err(RunwayError::Settings(format!(
            "No database at {}. Run `runway init` first.",
            path.display()
        )));
    }
    get_connection(&path)
}

pub(crate) fn signed_in() -> Result<Ctx> {
    let settings = load_settings();
    let session = require_session(&settings)?.clone();
    let conn = open_db()?;
    Ok(Ctx {
        settings,
        session,
        conn,
    })
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Parser)]
#[command(name = "runway", about = "Cash, burn and runway tracking for early-stage startups.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up runway: choose a data directory and initialize the database.
    Init {
        /// Path for runway data (default: ~/Documents/runway)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Create an account and sign in.
    Signup {
        #[arg(long)]
        email: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign in with an existing account.
    Login {
        #[arg(long)]
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out.
    Logout,
    /// Show or edit the signed-in profile.
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Show or change display settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Show the four headline metrics, alerts and integrations.
    Dashboard {
        /// Count pending transactions in the metrics
        #[arg(long)]
        include_pending: bool,
    },
    /// Record a transaction.
    Add {
        /// income or expense
        #[arg(long = "type")]
        txn_type: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// completed or pending
        #[arg(long, default_value = "completed")]
        status: String,
        /// Client id to link the transaction to
        #[arg(long)]
        client: Option<i64>,
    },
    /// List transactions, optionally filtered.
    List {
        /// Matches description or category
        #[arg(long)]
        search: Option<String>,
        /// all, income or expense
        #[arg(long = "type", default_value = "all")]
        txn_type: String,
        /// Exact category, or "all"
        #[arg(long)]
        category: Option<String>,
        /// all, today, week, month or year
        #[arg(long, default_value = "all")]
        range: String,
        /// completed or pending
        #[arg(long)]
        status: Option<String>,
    },
    /// Mark a transaction completed or pending.
    SetStatus {
        id: i64,
        status: String,
    },
    /// Manage clients.
    Clients {
        #[command(subcommand)]
        command: ClientsCommands,
    },
    /// Show alerts derived from the current metrics.
    Alerts,
    /// Show or refresh connected services.
    Integrations {
        #[command(subcommand)]
        command: IntegrationsCommands,
    },
    /// Export a report to PDF.
    #[cfg(feature = "pdf")]
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Import transactions from a CSV file.
    Import {
        /// Path to CSV file (date,description,amount,type,category[,status])
        file: String,
    },
    /// Load six months of sample transactions.
    Demo,
    /// Show data directory, session and record counts.
    Status,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the signed-in user.
    Show,
    /// Change the display name.
    Name { name: String },
    /// Change the password.
    Password {
        #[arg(long)]
        current: Option<String>,
        #[arg(long)]
        new: Option<String>,
        #[arg(long)]
        confirm: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print current settings.
    Show,
    /// Set the display currency: INR, USD or EUR.
    Currency { code: String },
    /// Set the date format: DD/MM/YYYY, MM/DD/YYYY or YYYY-MM-DD.
    DateFormat { format: String },
}

#[derive(Subcommand)]
pub enum ClientsCommands {
    /// List clients.
    List {
        /// Matches name, company or category
        #[arg(long)]
        search: Option<String>,
    },
    /// Add a client.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long, default_value = "General")]
        category: String,
        /// active or inactive
        #[arg(long, default_value = "active")]
        status: String,
    },
    /// Show a client with its transactions.
    Show { id: i64 },
}

#[derive(Subcommand)]
pub enum IntegrationsCommands {
    /// List integrations and their last sync.
    List,
    /// Refresh every integration.
    Sync,
}

#[cfg(feature = "pdf")]
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Ledger with running balance.
    CashBalance {
        #[arg(long)]
        output: Option<String>,
    },
    /// Monthly expenses by category.
    BurnRate {
        #[arg(long, default_value_t = 6)]
        months: u32,
        #[arg(long)]
        output: Option<String>,
    },
    /// Monthly revenue, growth and sources.
    RevenueGrowth {
        #[arg(long, default_value_t = 6)]
        months: u32,
        #[arg(long)]
        output: Option<String>,
    },
    /// Current runway and burn scenarios.
    Runway {
        #[arg(long)]
        output: Option<String>,
    },
    /// Recommendations and benchmarks.
    Insights {
        #[arg(long)]
        output: Option<String>,
    },
    /// One client's transactions and totals.
    Client {
        #[arg(long)]
        client: i64,
        #[arg(long)]
        output: Option<String>,
    },
    /// Every report except the client report.
    All {
        #[arg(long, default_value_t = 6)]
        months: u32,
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
    },
}
