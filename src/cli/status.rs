use crate::db::{get_connection, DB_FILE};
use crate::error::Result;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    let user = settings.session.as_ref().map(|s| s.email.as_str());
    println!("Signed in:  {}", user.unwrap_or("(no)"));
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());
    println!("Currency:   {}", settings.currency.code());

    if db_path.exists() {
        let conn = get_connection(&db_path)?;
        let count = |sql: &str| -> Result<i64> { Ok(conn.query_row(sql, [], |r| r.get(0))?) };

        println!();
        println!("Transactions:  {}", count("SELECT count(*) FROM transactions")?);
        let pending = count("SELECT count(*) FROM transactions WHERE status = 'pending'")?;
        println!("Pending:       {pending}");
        println!("Clients:       {}", count("SELECT count(*) FROM clients")?);
        println!("Imports:       {}", count("SELECT count(*) FROM imports")?);
        println!("Users:         {}", count("SELECT count(*) FROM users")?);
    } else {
        println!();
        println!("Database not found. Run `runway init` to set up.");
    }

    Ok(())
}
