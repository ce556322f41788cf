use crate::error::Result;
use crate::fmt::{Currency, DateFormat};
use crate::settings::{load_settings, save_settings};

pub fn show() -> Result<()> {
    let settings = load_settings();
    println!("Data dir:     {}", settings.data_dir);
    println!("Currency:     {} ({})", settings.currency.code(), settings.currency.symbol());
    println!("Date format:  {}", settings.date_format.label());
    match &settings.session {
        Some(s) => println!("Signed in:    {}", s.email),
        None => println!("Signed in:    (no)"),
    }
    Ok(())
}

pub fn set_currency(code: &str) -> Result<()> {
    let currency: Currency = code.parse()?;
    let mut settings = load_settings();
    settings.currency = currency;
    save_settings(&settings)?;
    println!("Currency set to {}. Example: {}", currency.code(), currency.format(1234567.0));
    Ok(())
}

pub fn set_date_format(format: &str) -> Result<()> {
    let date_format: DateFormat = format.parse()?;
    let mut settings = load_settings();
    settings.date_format = date_format;
    save_settings(&settings)?;
    println!("Date format set to {}.", date_format.label());
    Ok(())
}
