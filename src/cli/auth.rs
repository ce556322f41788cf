use zeroize::Zeroizing;

use crate::auth;
use crate::cli::{open_db, signed_in};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, Session};

/// Use the flag value if given, otherwise prompt without echo.
fn password_or_prompt(given: Option<String>, prompt: &str) -> Result<Zeroizing<String>> {
    match given {
        Some(p) => Ok(Zeroizing::new(p)),
        None => Ok(Zeroizing::new(rpassword::prompt_password(prompt)?)),
    }
}

fn start_session(user_id: i64, email: &str) -> Result<()> {
    let mut settings = load_settings();
    settings.session = Some(Session {
        user_id,
        email: email.to_string(),
    });
    save_settings(&settings)
}

pub fn signup(email: &str, name: &str, password: Option<String>) -> Result<()> {
    let conn = open_db()?;
    let password = password_or_prompt(password, "Choose a password: ")?;
    let user = auth::sign_up(&conn, email, &password, name)?;
    start_session(user.id, &user.email)?;
    println!("Welcome, {}. You are signed in as {}.", user.display_name, user.email);
    Ok(())
}

pub fn login(email: &str, password: Option<String>) -> Result<()> {
    let conn = open_db()?;
    let password = password_or_prompt(password, "Password: ")?;
    let user = auth::sign_in(&conn, email, &password)?;
    start_session(user.id, &user.email)?;
    println!("Signed in as {}.", user.email);
    Ok(())
}

pub fn logout() -> Result<()> {
    let mut settings = load_settings();
    match settings.session.take() {
        Some(session) => {
            save_settings(&settings)?;
            tracing::info!(user_id = session.user_id, "signed out");
            println!("Signed out {}.", session.email);
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

pub fn show() -> Result<()> {
    let ctx = signed_in()?;
    let user = auth::get_user(&ctx.conn, ctx.session.user_id)?;
    println!("Name:   {}", user.display_name);
    println!("Email:  {}", user.email);
    Ok(())
}

pub fn rename(name: &str) -> Result<()> {
    let ctx = signed_in()?;
    let user = auth::update_profile(&ctx.conn, ctx.session.user_id, name)?;
    println!("Display name set to {}.", user.display_name);
    Ok(())
}

pub fn change_password(
    current: Option<String>,
    new: Option<String>,
    confirm: Option<String>,
) -> Result<()> {
    let ctx = signed_in()?;
    let current = password_or_prompt(current, "Current password: ")?;
    let new = password_or_prompt(new, "New password: ")?;
    let confirm = password_or_prompt(confirm, "Confirm new password: ")?;
    auth::change_password(&ctx.conn, ctx.session.user_id, &current, &new, &confirm)?;
    println!("Password updated.");
    Ok(())
}
