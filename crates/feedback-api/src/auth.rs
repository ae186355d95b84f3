use std::sync::Arc;

use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};

use feedback_db::Database;
use feedback_db::models::InsertOutcome;
use feedback_types::api::{Claims, FieldError, LoginForm, RegisterForm};

use crate::credentials::{self, AuthError};
use crate::error::AppError;
use crate::middleware::{clear_session, session_cookie, take_flash};
use crate::{blocking, blocking_result, pages};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub session_ttl: chrono::Duration,
}

/// GET /register
pub async fn register_page(jar: CookieJar) -> impl IntoResponse {
    let (jar, flash) = take_flash(jar);
    (
        jar,
        Html(pages::register_page(&RegisterForm::default(), None, flash.as_deref())),
    )
}

/// POST /register — create the account and log it in.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let reg = match form.validate() {
        Ok(reg) => reg,
        Err(e) => return Ok(Html(pages::register_page(&form, Some(&e), None)).into_response()),
    };

    let db = state.clone();
    let outcome = blocking(move || {
        let user = credentials::register(&reg)?;
        let outcome = db.db.create_user(&user)?;
        Ok((user.username, outcome))
    })
    .await?;

    match outcome {
        (username, InsertOutcome::Created) => {
            info!("Registered user {}", username);
            let token = create_token(&state.jwt_secret, &username, state.session_ttl)?;
            let jar = jar.add(session_cookie(token));
            Ok((jar, Redirect::to(&format!("/users/{username}"))).into_response())
        }
        (username, InsertOutcome::Duplicate) => {
            info!("Registration rejected, {} or its email is taken", username);
            let error = FieldError::new("username", "Username unavailable");
            Ok(Html(pages::register_page(&form, Some(&error), None)).into_response())
        }
    }
}

/// GET /login
pub async fn login_page(jar: CookieJar) -> impl IntoResponse {
    let (jar, flash) = take_flash(jar);
    (
        jar,
        Html(pages::login_page(&LoginForm::default(), None, flash.as_deref())),
    )
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let login = match form.validate() {
        Ok(login) => login,
        Err(e) => return Ok(Html(pages::login_page(&form, Some(&e), None)).into_response()),
    };

    let db = state.clone();
    let result = blocking_result(move || {
        credentials::authenticate(&db.db, &login.username, &login.password)
    })
    .await?;

    match result {
        Ok(user) => {
            info!("User {} logged in", user.username);
            let token = create_token(&state.jwt_secret, &user.username, state.session_ttl)?;
            let jar = jar.add(session_cookie(token));
            Ok((jar, Redirect::to(&format!("/users/{}", user.username))).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            warn!("Failed login for {}", form.username.trim());
            let error = FieldError::new("username", AuthError::InvalidCredentials.to_string());
            Ok(Html(pages::login_page(&form, Some(&error), None)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /logout
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (clear_session(jar), Redirect::to("/login"))
}

pub fn create_token(secret: &str, username: &str, ttl: chrono::Duration) -> anyhow::Result<String> {
    let now = chrono::Utc::now();
    let expires = now
        .checked_add_signed(ttl)
        .ok_or_else(|| anyhow::anyhow!("session lifetime of {} days is out of range", ttl.num_days()))?;
    let claims = Claims {
        sub: username.to_string(),
        iat: now.timestamp() as usize,
        exp: expires.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
