//! Database row types. These map directly to SQLite rows and are kept
//! separate from the view models in feedback-types.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub username: String,
    /// Argon2 PHC string, never plaintext.
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: String,
}

/// A user record ready to insert. `password_hash` must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone)]
pub struct FeedbackRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub username: String,
    pub created_at: String,
}

/// Result of inserting a row guarded by unique constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    /// Username or email already registered. Nothing was written.
    Duplicate,
}
