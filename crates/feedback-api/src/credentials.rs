//! Password hashing and credential checks.
//!
//! Passwords are hashed with Argon2id and a random per-user salt; the PHC
//! string (algorithm, parameters, salt and digest) is what the store keeps.

use std::sync::LazyLock;

use anyhow::anyhow;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand_core::OsRng;
use thiserror::Error;

use feedback_db::Database;
use feedback_db::models::{NewUser, UserRow};
use feedback_types::api::Registration;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user or wrong password. The two are deliberately not told apart.
    #[error("Invalid username/password")]
    InvalidCredentials,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Verified against when the username does not exist, so a miss costs the
/// same as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("feedback-dummy-password").ok());

/// Build a user record with the password hashed. Does not persist; the
/// caller inserts it and handles a duplicate username or email.
pub fn register(reg: &Registration) -> anyhow::Result<NewUser> {
    Ok(NewUser {
        username: reg.username.clone(),
        password_hash: hash_password(&reg.password)?,
        email: reg.email.clone(),
        first_name: reg.first_name.clone(),
        last_name: reg.last_name.clone(),
    })
}

/// Look up `username` and check `password` against the stored hash.
pub fn authenticate(db: &Database, username: &str, password: &str) -> Result<UserRow, AuthError> {
    let Some(user) = db.get_user(username)? else {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            let _ = verify_password(password, dummy);
        }
        return Err(AuthError::InvalidCredentials);
    };

    if verify_password(password, &user.password)? {
        Ok(user)
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

/// Ok(false) on mismatch. Errors only if `hash` is not a valid PHC string.
pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("corrupt password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
