//! SQLite-based currency ledger and typing-score history.
//!
//! Both tables are append-only; rows are never mutated or deleted. The
//! balance is always recomputed from the transaction sum.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};

use super::{data_dir, migrations, parse_date, parse_ts, DB_FILE};
use crate::error::{DatabaseError, Result};

/// One signed balance delta with its audit reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyTransaction {
    pub id: i64,
    pub amount: f64,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// One submitted typing result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingScore {
    pub id: i64,
    pub wpm: u32,
    pub date: NaiveDate,
    pub is_record: bool,
}

/// SQLite database for the currency ledger.
pub struct LedgerDb {
    conn: Connection,
}

/// The ledger operations, usable either directly on [`LedgerDb`] or inside
/// an exclusive transaction scope (see [`LedgerDb::exclusive`]).
pub struct LedgerView<'a> {
    conn: &'a Connection,
}

impl<'a> LedgerView<'a> {
    /// Append a transaction, stamping the current time. Returns the new id.
    pub fn append_transaction(&self, amount: f64, reason: &str) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO currency_transactions (amount, reason, timestamp)
             VALUES (?1, ?2, ?3)",
            params![amount, reason, Utc::now().to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Sum of all transaction amounts, `None` for an empty ledger.
    pub fn sum_transactions(&self) -> Result<Option<f64>, rusqlite::Error> {
        self.conn
            .query_row("SELECT SUM(amount) FROM currency_transactions", [], |row| {
                row.get::<_, Option<f64>>(0)
            })
    }

    /// The most recent transactions, newest first.
    pub fn recent_transactions(
        &self,
        limit: usize,
    ) -> Result<Vec<CurrencyTransaction>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, amount, reason, timestamp FROM currency_transactions
             ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            let timestamp: String = row.get(3)?;
            Ok(CurrencyTransaction {
                id: row.get(0)?,
                amount: row.get(1)?,
                reason: row.get(2)?,
                timestamp: parse_ts(3, &timestamp)?,
            })
        })?;
        rows.collect()
    }

    /// The best recorded typing speed, `None` if nothing was submitted yet.
    pub fn max_wpm(&self) -> Result<Option<u32>, rusqlite::Error> {
        self.conn
            .query_row("SELECT MAX(wpm) FROM typing_scores", [], |row| {
                row.get::<_, Option<u32>>(0)
            })
    }

    /// Append a typing score. Returns the new id.
    pub fn append_typing_score(
        &self,
        wpm: u32,
        date: NaiveDate,
        is_record: bool,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO typing_scores (wpm, date, is_record) VALUES (?1, ?2, ?3)",
            params![wpm, date.format("%Y-%m-%d").to_string(), is_record],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Full typing history, oldest first.
    pub fn typing_scores(&self) -> Result<Vec<TypingScore>, rusqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, wpm, date, is_record FROM typing_scores ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            let date: String = row.get(2)?;
            Ok(TypingScore {
                id: row.get(0)?,
                wpm: row.get(1)?,
                date: parse_date(2, &date)?,
                is_record: row.get(3)?,
            })
        })?;
        rows.collect()
    }
}

impl LedgerDb {
    /// Open the ledger at `~/.config/deadliner/deadliner.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join(DB_FILE);
        Self::open_at(&path)
    }

    /// Open the ledger at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory ledger (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        migrations::migrate(&self.conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    fn view(&self) -> LedgerView<'_> {
        LedgerView { conn: &self.conn }
    }

    pub fn append_transaction(&self, amount: f64, reason: &str) -> Result<i64, rusqlite::Error> {
        self.view().append_transaction(amount, reason)
    }

    pub fn sum_transactions(&self) -> Result<Option<f64>, rusqlite::Error> {
        self.view().sum_transactions()
    }

    pub fn recent_transactions(
        &self,
        limit: usize,
    ) -> Result<Vec<CurrencyTransaction>, rusqlite::Error> {
        self.view().recent_transactions(limit)
    }

    pub fn max_wpm(&self) -> Result<Option<u32>, rusqlite::Error> {
        self.view().max_wpm()
    }

    pub fn append_typing_score(
        &self,
        wpm: u32,
        date: NaiveDate,
        is_record: bool,
    ) -> Result<i64, rusqlite::Error> {
        self.view().append_typing_score(wpm, date, is_record)
    }

    pub fn typing_scores(&self) -> Result<Vec<TypingScore>, rusqlite::Error> {
        self.view().typing_scores()
    }

    /// Run `f` inside a single IMMEDIATE transaction.
    ///
    /// Writers elsewhere see either none or all of the writes, and no other
    /// connection can interleave between a read and a dependent write made
    /// inside `f`. An error from `f` rolls everything back.
    pub fn exclusive<T>(
        &mut self,
        f: impl FnOnce(&LedgerView<'_>) -> Result<T, rusqlite::Error>,
    ) -> Result<T, rusqlite::Error> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&LedgerView { conn: &*tx })?;
        tx.commit()?;
        Ok(out)
    }
}
