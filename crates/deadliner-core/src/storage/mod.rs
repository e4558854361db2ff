mod config;
pub mod ledger_db;
pub mod migrations;
pub mod task_db;

pub use config::{Config, MonitorConfig, NotificationsConfig};
pub use ledger_db::{CurrencyTransaction, LedgerDb, LedgerView, TypingScore};
pub use task_db::TaskDb;

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};

pub(crate) const DB_FILE: &str = "deadliner.db";

/// Returns `~/.config/deadliner[-dev]/` based on DEADLINER_ENV.
///
/// Set DEADLINER_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DEADLINER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("deadliner-dev")
    } else {
        base_dir.join("deadliner")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Parse an RFC 3339 column strictly; a corrupt timestamp is a query error,
/// not a silent "now".
pub(crate) fn parse_ts(idx: usize, value: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Parse a `YYYY-MM-DD` column.
pub(crate) fn parse_date(idx: usize, value: &str) -> Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
