//! Database schema migrations for deadliner.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current version. Both
//! stores share one database file, so either may run the migrations first.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations.
///
/// # Errors
/// Returns an error if a migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = schema_version(conn);
    if current_version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Current schema version, 0 for a fresh database.
fn schema_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, Option<i64>>(0)
    })
    .ok()
    .flatten()
    .unwrap_or(0)
}

fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS tasks (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            name                TEXT NOT NULL,
            user_deadline       TEXT NOT NULL,
            artificial_deadline TEXT NOT NULL,
            status              TEXT NOT NULL DEFAULT 'pending',
            created_at          TEXT NOT NULL,
            completed_at        TEXT
        );

        CREATE TABLE IF NOT EXISTS currency_transactions (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            amount    REAL NOT NULL,
            reason    TEXT NOT NULL,
            timestamp TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS typing_scores (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            wpm       INTEGER NOT NULL,
            date      TEXT NOT NULL,
            is_record INTEGER NOT NULL DEFAULT 0
        );

        -- Indexes for the common query patterns
        CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
        CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
        CREATE INDEX IF NOT EXISTS idx_transactions_timestamp
            ON currency_transactions(timestamp);

        INSERT INTO schema_version (version) VALUES (1);

        COMMIT;",
    )
}
