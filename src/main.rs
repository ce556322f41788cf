mod alerts;
mod auth;
mod cli;
mod clients;
mod db;
mod error;
mod filter;
mod fmt;
mod importer;
mod integrations;
mod metrics;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod reports;
mod settings;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, ClientsCommands, Commands, ConfigCommands, IntegrationsCommands, ProfileCommands};

/// Log filter env var; defaults to warnings only so command output stays clean.
const LOG_ENV: &str = "RUNWAY_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("runway=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Signup {
            email,
            name,
            password,
        } => cli::auth::signup(&email, &name, password),
        Commands::Login { email, password } => cli::auth::login(&email, password),
        Commands::Logout => cli::auth::logout(),
        Commands::Profile { command } => match command {
            ProfileCommands::Show => cli::auth::show(),
            ProfileCommands::Name { name } => cli::auth::rename(&name),
            ProfileCommands::Password {
                current,
                new,
                confirm,
            } => cli::auth::change_password(current, new, confirm),
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Currency { code } => cli::config::set_currency(&code),
            ConfigCommands::DateFormat { format } => cli::config::set_date_format(&format),
        },
        Commands::Dashboard { include_pending } => cli::dashboard::run(include_pending),
        Commands::Add {
            txn_type,
            amount,
            description,
            category,
            date,
            status,
            client,
        } => cli::transactions::add(
            &txn_type,
            amount,
            &description,
            &category,
            date,
            &status,
            client,
        ),
        Commands::List {
            search,
            txn_type,
            category,
            range,
            status,
        } => cli::transactions::list(search, &txn_type, category, &range, status),
        Commands::SetStatus { id, status } => cli::transactions::update_status(id, &status),
        Commands::Clients { command } => match command {
            ClientsCommands::List { search } => cli::clients::list(search),
            ClientsCommands::Add {
                name,
                email,
                company,
                category,
                status,
            } => cli::clients::add(&name, &email, &company, &category, &status),
            ClientsCommands::Show { id } => cli::clients::show(id),
        },
        Commands::Alerts => cli::alerts::run(),
        Commands::Integrations { command } => match command {
            IntegrationsCommands::List => cli::integrations::list(),
            IntegrationsCommands::Sync => cli::integrations::sync(),
        },
        #[cfg(feature = "pdf")]
        Commands::Export { command } => cli::export::dispatch(command),
        Commands::Import { file } => cli::import::run(&file),
        Commands::Demo => cli::demo::run(),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
