use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Signing keys that must never protect a real deployment.
const PLACEHOLDER_SECRETS: &[&str] = &["dev-secret-change-me", "change-me-to-a-random-string"];

/// Longest session a login may grant, roughly ten years.
pub const MAX_SESSION_DAYS: i64 = 3650;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub session_secret: String,
    pub session_days: i64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config = Self {
            host: try_load("FEEDBACK_HOST", "0.0.0.0")?,
            port: try_load("FEEDBACK_PORT", "3000")?,
            db_path: try_load("FEEDBACK_DB_PATH", "feedback.db")?,
            session_secret: try_load("FEEDBACK_SESSION_SECRET", "dev-secret-change-me")?,
            session_days: check_session_days(try_load("FEEDBACK_SESSION_DAYS", "7")?)?,
        };

        if config.session_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&config.session_secret.as_str()) {
            warn!("FEEDBACK_SESSION_SECRET is unset or a placeholder; sessions can be forged");
        }

        Ok(config)
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Invalid {key} value: {raw}"))
}

fn check_session_days(days: i64) -> Result<i64> {
    if !(1..=MAX_SESSION_DAYS).contains(&days) {
        anyhow::bail!("FEEDBACK_SESSION_DAYS must be between 1 and {MAX_SESSION_DAYS}, got {days}");
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_days_within_bounds_are_kept() {
        assert_eq!(check_session_days(7).unwrap(), 7);
        assert_eq!(check_session_days(1).unwrap(), 1);
        assert_eq!(check_session_days(MAX_SESSION_DAYS).unwrap(), MAX_SESSION_DAYS);
    }

    #[test]
    fn session_days_out_of_bounds_are_rejected() {
        for days in [0, -1, MAX_SESSION_DAYS + 1, 100_000_000, i64::MAX] {
            let err = check_session_days(days).unwrap_err();
            assert!(err.to_string().contains("FEEDBACK_SESSION_DAYS"), "{days}");
        }
    }

    #[test]
    fn longest_session_still_yields_a_valid_lifetime() {
        let ttl = chrono::Duration::days(check_session_days(MAX_SESSION_DAYS).unwrap());
        assert!(chrono::Utc::now().checked_add_signed(ttl).is_some());
    }
}
