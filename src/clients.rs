use rusqlite::{Connection, Row};

use crate::error::{Result, RunwayError};
use crate::models::{Client, ClientStatus, NewClient, Transaction};
use crate::store::{client_transactions, totals};

fn row_to_client(row: &Row<'_>) -> rusqlite::Result<Client> {
    let status: String = row.get(5)?;
    Ok(Client {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        company: row.get(3)?,
        category: row.get(4)?,
        status: status.parse().map_err(|e: RunwayError| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?,
    })
}

pub fn list_clients(conn: &Connection) -> Result<Vec<Client>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, company, category, status FROM clients ORDER BY id",
    )?;
    let rows = stmt.query_map([], row_to_client)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn get_client(conn: &Connection, id: i64) -> Result<Client> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, company, category, status FROM clients WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map([id], row_to_client)?;
    match rows.next() {
        Some(c) => Ok(c?),
        None => Err(RunwayError::NotFound(format!("client {id}"))),
    }
}

pub fn add_client(conn: &Connection, client: &NewClient) -> Result<i64> {
    if client.name.trim().is_empty() {
        return Err(RunwayError::validation("name", "must not be empty"));
    }
    if !client.email.contains('@') {
        return Err(RunwayError::validation("email", format!("'{}'", client.email)));
    }
    conn.execute(
        "INSERT INTO clients (name, email, company, category, status) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            client.name.trim(),
            client.email.trim(),
            client.company.trim(),
            client.category.trim(),
            client.status.as_str(),
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, name = %client.name, "added client");
    Ok(id)
}

/// Case-insensitive substring search over name, company and category.
pub fn search<'a>(clients: &'a [Client], term: &str) -> Vec<&'a Client> {
    let needle = term.trim().to_lowercase();
    clients
        .iter()
        .filter(|c| {
            needle.is_empty()
                || c.name.to_lowercase().contains(&needle)
                || c.company.to_lowercase().contains(&needle)
                || c.category.to_lowercase().contains(&needle)
        })
        .collect()
}

pub struct ClientProfile {
    pub client: Client,
    pub transactions: Vec<Transaction>,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net: f64,
}

/// A client's transactions, joined on `transactions.client_id`.
pub fn profile(conn: &Connection, client: Client) -> Result<ClientProfile> {
    let transactions = client_transactions(conn, client.id)?;
    let t = totals(&transactions);
    Ok(ClientProfile {
        client,
        transactions,
        total_income: t.income,
        total_expenses: t.expenses,
        net: t.cash_balance,
    })
}

pub fn active_count(clients: &[Client]) -> usize {
    clients.iter().filter(|c| c.status == ClientStatus::Active).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::models::TxnType;
    use crate::store::{insert_transaction, new_txn};

    #[test]
    fn test_seeded_roster() {
        let (_dir, conn) = test_db();
        let clients = list_clients(&conn).unwrap();
        assert_eq!(clients.len(), 4);
        assert_eq!(active_count(&clients), 4);
        assert_eq!(clients[0].company, "TechCorp Inc.");
    }

    #[test]
    fn test_search_name_company_category() {
        let (_dir, conn) = test_db();
        let clients = list_clients(&conn).unwrap();
        assert_eq!(search(&clients, "techcorp").len(), 1);
        assert_eq!(search(&clients, "DESIGN").len(), 1);
        assert_eq!(search(&clients, "finance")[0].company, "Finance Analytics");
        assert_eq!(search(&clients, "").len(), 4);
        assert!(search(&clients, "nobody").is_empty());
    }

    #[test]
    fn test_add_and_get_client() {
        let (_dir, conn) = test_db();
        let id = add_client(
            &conn,
            &NewClient {
                name: "Ada Quinn".to_string(),
                email: "ada@orbit.example".to_string(),
                company: "Orbit Labs".to_string(),
                category: "Technology".to_string(),
                status: ClientStatus::Inactive,
            },
        )
        .unwrap();
        let c = get_client(&conn, id).unwrap();
        assert_eq!(c.name, "Ada Quinn");
        assert_eq!(c.status, ClientStatus::Inactive);
        assert!(matches!(get_client(&conn, 999), Err(RunwayError::NotFound(_))));
    }

    #[test]
    fn test_add_client_rejects_bad_email() {
        let (_dir, conn) = test_db();
        let result = add_client(
            &conn,
            &NewClient {
                name: "No Mail".to_string(),
                email: "nomail".to_string(),
                company: String::new(),
                category: String::new(),
                status: ClientStatus::Active,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_uses_client_id_not_description() {
        let (_dir, conn) = test_db();
        let client = get_client(&conn, 1).unwrap();

        let mut linked = new_txn("2024-05-01", "Retainer", 5000.0, TxnType::Income, "Revenue");
        linked.client_id = Some(client.id);
        insert_transaction(&conn, &linked).unwrap();
        let mut refund = new_txn("2024-05-03", "Refund", 500.0, TxnType::Expense, "Other");
        refund.client_id = Some(client.id);
        insert_transaction(&conn, &refund).unwrap();
        // Mentions the company but is not linked to it
        let tickets = new_txn(
            "2024-05-02",
            "TechCorp Inc. conference tickets",
            300.0,
            TxnType::Expense,
            "Marketing",
        );
        insert_transaction(&conn, &tickets).unwrap();

        let p = profile(&conn, client).unwrap();
        assert_eq!(p.transactions.len(), 2);
        assert_eq!(p.total_income, 5000.0);
        assert_eq!(p.total_expenses, 500.0);
        assert_eq!(p.net, 4500.0);
    }
}
