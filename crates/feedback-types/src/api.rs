use std::fmt;

use serde::{Deserialize, Serialize};

// -- Session claims --

/// Claims carried by the signed session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the logged-in user.
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

// -- Column limits --

pub const USERNAME_MAX: usize = 20;
pub const EMAIL_MAX: usize = 50;
pub const NAME_MAX: usize = 30;
pub const TITLE_MAX: usize = 100;

/// Usernames that would shadow a static route segment under `/users/`.
const RESERVED_USERNAMES: &[&str] = &["feedback"];

/// A validation failure tied to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// -- Registration --

/// Raw registration form. Missing fields decode as empty strings so the
/// handler can re-render the form instead of rejecting the request.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Registration input that passed validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration, FieldError> {
        let username = validate_username(&self.username)?;
        if self.password.is_empty() {
            return Err(FieldError::new("password", "Password is required"));
        }
        let email = validate_email(&self.email)?;
        let first_name = required("first_name", "First name", &self.first_name, NAME_MAX)?;
        let last_name = required("last_name", "Last name", &self.last_name, NAME_MAX)?;

        Ok(Registration {
            username,
            password: self.password.clone(),
            email,
            first_name,
            last_name,
        })
    }
}

// -- Login --

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Login {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Login, FieldError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(FieldError::new("username", "Username is required"));
        }
        if self.password.is_empty() {
            return Err(FieldError::new("password", "Password is required"));
        }
        Ok(Login {
            username: username.to_string(),
            password: self.password.clone(),
        })
    }
}

// -- Feedback --

/// Used for both creating and editing feedback.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FeedbackForm {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct FeedbackInput {
    pub title: String,
    pub content: String,
}

impl FeedbackForm {
    pub fn validate(&self) -> Result<FeedbackInput, FieldError> {
        let title = required("title", "Title", &self.title, TITLE_MAX)?;
        let content = self.content.trim();
        if content.is_empty() {
            return Err(FieldError::new("content", "Content is required"));
        }
        Ok(FeedbackInput {
            title,
            content: content.to_string(),
        })
    }
}

// -- Field rules --

fn validate_username(raw: &str) -> Result<String, FieldError> {
    let username = required("username", "Username", raw, USERNAME_MAX)?;
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');
    if !username.chars().all(allowed) {
        return Err(FieldError::new(
            "username",
            "Username may only contain letters, digits, '_', '-' and '.'",
        ));
    }
    if RESERVED_USERNAMES.contains(&username.to_ascii_lowercase().as_str()) {
        return Err(FieldError::new("username", "Username unavailable"));
    }
    Ok(username)
}

fn validate_email(raw: &str) -> Result<String, FieldError> {
    let email = required("email", "Email", raw, EMAIL_MAX)?;
    let well_formed = matches!(
        email.split_once('@'),
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@')
    );
    if !well_formed {
        return Err(FieldError::new("email", "Enter a valid email address"));
    }
    Ok(email)
}

fn required(field: &'static str, label: &str, raw: &str, max: usize) -> Result<String, FieldError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(FieldError::new(field, format!("{label} is required")));
    }
    if value.chars().count() > max {
        return Err(FieldError::new(
            field,
            format!("{label} must be at most {max} characters"),
        ));
    }
    Ok(value.to_string())
}
