use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered user as shown on their page. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A titled comment owned by exactly one user.
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}
