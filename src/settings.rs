use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::db::DB_FILE;
use crate::error::{Result, RunwayError};
use crate::fmt::{Currency, DateFormat};

/// The signed-in user, persisted between invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub date_format: DateFormat,
    #[serde(default)]
    pub session: Option<Session>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_string(),
            currency: Currency::default(),
            date_format: DateFormat::default(),
            session: None,
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("runway")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("runway")
}

fn default_data_dir_string() -> String {
    default_data_dir().to_string_lossy().to_string()
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "unreadable settings, using defaults"
                );
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}

pub fn db_path() -> PathBuf {
    get_data_dir().join(DB_FILE)
}

/// The active session, or `NotSignedIn`.
pub fn require_session(settings: &Settings) -> Result<&Session> {
    settings.session.as_ref().ok_or(RunwayError::NotSignedIn)
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            currency: Currency::Usd,
            date_format: DateFormat::Iso,
            session: Some(Session {
                user_id: 3,
                email: "a@b.co".to_string(),
            }),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.data_dir, "/tmp/test");
        assert_eq!(loaded.currency, Currency::Usd);
        assert_eq!(loaded.date_format, DateFormat::Iso);
        assert_eq!(loaded.session.unwrap().user_id, 3);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.currency, Currency::Inr);
        assert_eq!(s.date_format, DateFormat::DayMonthYear);
        assert!(s.session.is_none());
        assert!(!s.data_dir.is_empty());
    }

    #[test]
    fn test_missing_data_dir_keeps_session() {
        let json = r#"{"currency": "USD", "session": {"user_id": 7, "email": "kim@co.io"}}"#;
        let loaded: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(loaded.data_dir, default_data_dir_string());
        assert_eq!(loaded.currency, Currency::Usd);
        assert_eq!(loaded.session.unwrap().email, "kim@co.io");
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test", "currency": "EUR"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.currency, Currency::Eur);
        assert_eq!(s.date_format, DateFormat::DayMonthYear);
        assert!(s.session.is_none());
    }

    #[test]
    fn test_require_session() {
        let mut s = Settings::default();
        assert!(matches!(require_session(&s), Err(RunwayError::NotSignedIn)));
        s.session = Some(Session { user_id: 1, email: "x@y.z".to_string() });
        assert_eq!(require_session(&s).unwrap().user_id, 1);
    }
}
