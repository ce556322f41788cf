//! Email/password accounts stored alongside the books.
//!
//! Passwords are kept as Argon2id PHC strings; plaintext never touches the
//! database.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rusqlite::{Connection, OptionalExtension};

use crate::error::{Result, RunwayError};
use crate::models::User;

pub const MIN_PASSWORD_LEN: usize = 6;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| RunwayError::Auth(format!("Could not hash password: {e}")))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

fn check_password_rules(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(RunwayError::Auth(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = matches!(
        email.split_once('@'),
        Some((user, domain)) if !user.is_empty() && !domain.is_empty()
    );
    if valid {
        Ok(email)
    } else {
        Err(RunwayError::Auth(format!("Invalid email address: {email}")))
    }
}

fn find_by_email(conn: &Connection, email: &str) -> Result<Option<(User, String)>> {
    let row = conn
        .query_row(
            "SELECT id, email, display_name, password_hash FROM users WHERE email = ?1",
            [email],
            |row| {
                Ok((
                    User {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        display_name: row.get(2)?,
                    },
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;
    Ok(row)
}

pub fn get_user(conn: &Connection, user_id: i64) -> Result<User> {
    conn.query_row(
        "SELECT id, email, display_name FROM users WHERE id = ?1",
        [user_id],
        |row| {
            Ok(User {
                id: row.get(0)?,
                email: row.get(1)?,
                display_name: row.get(2)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| RunwayError::NotFound(format!("user {user_id}")))
}

pub fn sign_up(conn: &Connection, email: &str, password: &str, display_name: &str) -> Result<User> {
    let email = normalize_email(email)?;
    check_password_rules(password)?;
    if find_by_email(conn, &email)?.is_some() {
        return Err(RunwayError::Auth(format!("An account already exists for {email}")));
    }
    let hash = hash_password(password)?;
    conn.execute(
        "INSERT INTO users (email, display_name, password_hash) VALUES (?1, ?2, ?3)",
        rusqlite::params![email, display_name.trim(), hash],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(user_id = id, "created account");
    Ok(User {
        id,
        email,
        display_name: display_name.trim().to_string(),
    })
}

pub fn sign_in(conn: &Connection, email: &str, password: &str) -> Result<User> {
    let email = normalize_email(email)?;
    match find_by_email(conn, &email)? {
        Some((user, hash)) if verify_password(password, &hash) => {
            tracing::info!(user_id = user.id, "signed in");
            Ok(user)
        }
        _ => {
            tracing::warn!("failed sign-in attempt");
            Err(RunwayError::Auth(INVALID_CREDENTIALS.to_string()))
        }
    }
}

pub fn update_profile(conn: &Connection, user_id: i64, display_name: &str) -> Result<User> {
    let name = display_name.trim();
    if name.is_empty() {
        return Err(RunwayError::validation("display name", "must not be empty"));
    }
    let changed = conn.execute(
        "UPDATE users SET display_name = ?1 WHERE id = ?2",
        rusqlite::params![name, user_id],
    )?;
    if changed == 0 {
        return Err(RunwayError::NotFound(format!("user {user_id}")));
    }
    get_user(conn, user_id)
}

/// Change a password after re-authenticating with the current one.
pub fn change_password(
    conn: &Connection,
    user_id: i64,
    current: &str,
    new: &str,
    confirm: &str,
) -> Result<()> {
    if new != confirm {
        return Err(RunwayError::Auth("New passwords do not match".to_string()));
    }
    check_password_rules(new)?;

    let user = get_user(conn, user_id)?;
    sign_in(conn, &user.email, current)
        .map_err(|_| RunwayError::Auth("Current password is incorrect".to_string()))?;

    let hash = hash_password(new)?;
    conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE id = ?2",
        rusqlite::params![hash, user_id],
    )?;
    tracing::info!(user_id, "changed password");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[test]
    fn test_sign_up_then_sign_in() {
        let (_dir, conn) = test_db();
        let user = sign_up(&conn, " Founder@Startup.io ", "hunter22", "Sam Founder").unwrap();
        assert_eq!(user.email, "founder@startup.io");
        let again = sign_in(&conn, "founder@startup.io", "hunter22").unwrap();
        assert_eq!(again.id, user.id);
        assert_eq!(again.display_name, "Sam Founder");
    }

    #[test]
    fn test_password_is_not_stored_in_plaintext() {
        let (_dir, conn) = test_db();
        sign_up(&conn, "a@b.io", "hunter22", "A").unwrap();
        let stored: String = conn
            .query_row("SELECT password_hash FROM users", [], |r| r.get(0))
            .unwrap();
        assert!(!stored.contains("hunter22"));
        assert!(stored.starts_with("$argon2"));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let (_dir, conn) = test_db();
        sign_up(&conn, "a@b.io", "hunter22", "A").unwrap();
        let err = sign_in(&conn, "a@b.io", "wrong-pass").unwrap_err();
        assert_eq!(err.to_string(), INVALID_CREDENTIALS);
        assert!(sign_in(&conn, "nobody@b.io", "hunter22").is_err());
    }

    #[test]
    fn test_sign_up_validation() {
        let (_dir, conn) = test_db();
        assert!(sign_up(&conn, "not-an-email", "hunter22", "A").is_err());
        assert!(sign_up(&conn, "a@b.io", "short", "A").is_err());
        sign_up(&conn, "a@b.io", "hunter22", "A").unwrap();
        let dup = sign_up(&conn, "A@B.IO", "hunter22", "A").unwrap_err();
        assert!(dup.to_string().contains("already exists"), "got: {dup}");
    }

    #[test]
    fn test_update_profile() {
        let (_dir, conn) = test_db();
        let user = sign_up(&conn, "a@b.io", "hunter22", "A").unwrap();
        let updated = update_profile(&conn, user.id, "  Alex Builder ").unwrap();
        assert_eq!(updated.display_name, "Alex Builder");
        assert!(update_profile(&conn, user.id, "  ").is_err());
    }

    #[test]
    fn test_change_password_requires_current() {
        let (_dir, conn) = test_db();
        let user = sign_up(&conn, "a@b.io", "hunter22", "A").unwrap();

        let err =
            change_password(&conn, user.id, "wrong-pass", "newpass1", "newpass1").unwrap_err();
        assert!(err.to_string().contains("Current password"), "got: {err}");

        let err = change_password(&conn, user.id, "hunter22", "newpass1", "newpass2").unwrap_err();
        assert!(err.to_string().contains("do not match"), "got: {err}");

        assert!(change_password(&conn, user.id, "hunter22", "abc", "abc").is_err());

        change_password(&conn, user.id, "hunter22", "newpass1", "newpass1").unwrap();
        assert!(sign_in(&conn, "a@b.io", "hunter22").is_err());
        assert!(sign_in(&conn, "a@b.io", "newpass1").is_ok());
    }
}
