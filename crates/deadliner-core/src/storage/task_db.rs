//! SQLite-based task storage.
//!
//! Tasks are created once, then mutated only through status transitions;
//! rows are never deleted in normal operation. Ids are AUTOINCREMENT
//! rowids and are never reused.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, migrations, parse_ts, DB_FILE};
use crate::error::{DatabaseError, Result};
use crate::task::{Task, TaskStatus};

/// Parse task status from its database string.
fn parse_status(status_str: &str) -> TaskStatus {
    match status_str {
        "completed" => TaskStatus::Completed,
        "missed" => TaskStatus::Missed,
        _ => TaskStatus::Pending,
    }
}

/// Build a Task from a `SELECT id, name, user_deadline, artificial_deadline,
/// status, created_at, completed_at` row.
fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
    let user_deadline: String = row.get(2)?;
    let artificial_deadline: String = row.get(3)?;
    let status_str: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    let completed_at: Option<String> = row.get(6)?;

    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        user_deadline: parse_ts(2, &user_deadline)?,
        artificial_deadline: parse_ts(3, &artificial_deadline)?,
        status: parse_status(&status_str),
        created_at: parse_ts(5, &created_at)?,
        completed_at: completed_at.as_deref().map(|s| parse_ts(6, s)).transpose()?,
    })
}

/// SQLite database for task storage.
pub struct TaskDb {
    conn: Connection,
}

impl TaskDb {
    /// Open the task store at `~/.config/deadliner/deadliner.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join(DB_FILE);
        Self::open_at(&path)
    }

    /// Open the task store at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        migrations::migrate(&self.conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Insert a new pending task, stamping `created_at`. Returns the new id.
    pub fn add(
        &self,
        name: &str,
        user_deadline: DateTime<Utc>,
        artificial_deadline: DateTime<Utc>,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO tasks (name, user_deadline, artificial_deadline, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                name,
                user_deadline.to_rfc3339(),
                artificial_deadline.to_rfc3339(),
                TaskStatus::Pending.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get(&self, id: i64) -> Result<Option<Task>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, name, user_deadline, artificial_deadline, status, created_at, completed_at
                 FROM tasks WHERE id = ?1",
                params![id],
                row_to_task,
            )
            .optional()
    }

    /// All tasks created on the current UTC calendar day, ordered by
    /// artificial deadline ascending.
    pub fn tasks_for_today(&self) -> Result<Vec<Task>, rusqlite::Error> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(
            "SELECT id, name, user_deadline, artificial_deadline, status, created_at, completed_at
             FROM tasks
             WHERE created_at >= ?1
             ORDER BY artificial_deadline",
        )?;
        let rows = stmt.query_map(params![format!("{today}T00:00:00+00:00")], row_to_task)?;
        rows.collect()
    }

    /// Write a status transition. `completed_at` is stored as given, so a
    /// miss clears it while a completion stamps it.
    pub fn update_status(
        &self,
        id: i64,
        status: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE tasks SET status = ?1, completed_at = ?2 WHERE id = ?3",
            params![status.as_str(), completed_at.map(|t| t.to_rfc3339()), id],
        )?;
        Ok(())
    }
}
