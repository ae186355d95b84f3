use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Latest schema version this build knows how to create.
pub const SCHEMA_VERSION: i64 = 1;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version = current_version(conn)?;

    if version < 1 {
        info!("Running migration v1 (users, feedback)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                username    TEXT PRIMARY KEY NOT NULL,
                password    TEXT NOT NULL,
                email       TEXT NOT NULL UNIQUE,
                first_name  TEXT NOT NULL,
                last_name   TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE feedback (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL,
                content     TEXT NOT NULL,
                username    TEXT NOT NULL REFERENCES users(username),
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_feedback_username ON feedback(username);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete (schema v{})", current_version(conn)?);
    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;
    Ok(version)
}
