use crate::Database;
use crate::models::{FeedbackRow, InsertOutcome, NewUser, UserRow};
use anyhow::Result;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row};

impl Database {
    // -- Users --

    /// Insert a user. Returns `Duplicate` when the username or email is
    /// already taken; no row is written in that case.
    pub fn create_user(&self, user: &NewUser) -> Result<InsertOutcome> {
        self.with_conn(|conn| {
            let result = conn.execute(
                "INSERT INTO users (username, password, email, first_name, last_name)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (
                    &user.username,
                    &user.password_hash,
                    &user.email,
                    &user.first_name,
                    &user.last_name,
                ),
            );

            match result {
                Ok(_) => Ok(InsertOutcome::Created),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    Ok(InsertOutcome::Duplicate)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, username))
    }

    /// Delete a user together with all of their feedback in one transaction.
    /// Returns the number of feedback rows removed, or `None` if the user
    /// does not exist.
    pub fn delete_user(&self, username: &str) -> Result<Option<usize>> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;

            let removed = tx.execute("DELETE FROM feedback WHERE username = ?1", [username])?;
            let users = tx.execute("DELETE FROM users WHERE username = ?1", [username])?;

            if users == 0 {
                // Nothing committed; rollback on drop
                return Ok(None);
            }

            tx.commit()?;
            Ok(Some(removed))
        })
    }

    // -- Feedback --

    /// Insert feedback owned by `username`. Returns the new id.
    pub fn insert_feedback(&self, username: &str, title: &str, content: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO feedback (title, content, username) VALUES (?1, ?2, ?3)",
                (title, content, username),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_feedback(&self, id: i64) -> Result<Option<FeedbackRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, title, content, username, created_at FROM feedback WHERE id = ?1",
                    [id],
                    feedback_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// All feedback owned by `username`, oldest first.
    pub fn list_feedback(&self, username: &str) -> Result<Vec<FeedbackRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, content, username, created_at
                 FROM feedback
                 WHERE username = ?1
                 ORDER BY id",
            )?;

            let rows = stmt
                .query_map([username], feedback_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Returns false if no feedback has this id.
    pub fn update_feedback(&self, id: i64, title: &str, content: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE feedback SET title = ?1, content = ?2 WHERE id = ?3",
                rusqlite::params![title, content, id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Returns false if no feedback has this id.
    pub fn delete_feedback(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM feedback WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn query_user(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT username, password, email, first_name, last_name, created_at
         FROM users WHERE username = ?1",
    )?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                username: row.get(0)?,
                password: row.get(1)?,
                email: row.get(2)?,
                first_name: row.get(3)?,
                last_name: row.get(4)?,
                created_at: row.get(5)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn feedback_from_row(row: &Row<'_>) -> rusqlite::Result<FeedbackRow> {
    Ok(FeedbackRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        username: row.get(3)?,
        created_at: row.get(4)?,
    })
}
