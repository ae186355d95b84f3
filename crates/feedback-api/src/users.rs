use axum::{
    Extension,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use feedback_types::api::Claims;

use crate::auth::AppState;
use crate::error::AppError;
use crate::middleware::{clear_session, redirect_with_flash, take_flash};
use crate::{blocking, pages};

/// GET /
pub async fn index() -> Redirect {
    Redirect::to("/register")
}

pub async fn health() -> &'static str {
    "ok"
}

/// GET /users/{username} — profile plus all of the user's feedback.
pub async fn show_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let db = state.clone();
    let (user, feedback) = blocking(move || {
        let Some(user) = db.db.get_user(&username)? else {
            return Ok(None);
        };
        let feedback = db.db.list_feedback(&user.username)?;
        Ok(Some((user, feedback)))
    })
    .await?
    .ok_or(AppError::NotFound)?;

    let user = pages::user_view(user);
    let feedback: Vec<_> = feedback.into_iter().map(pages::feedback_view).collect();

    let (jar, flash) = take_flash(jar);
    let page = pages::user_page(&user, &feedback, &claims.sub, flash.as_deref());
    Ok((jar, Html(page)).into_response())
}

/// GET /users/{username}/delete — remove the account and everything it owns.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    require_user(&state, &username).await?;

    if claims.sub != username {
        warn!("{} tried to delete account {}", claims.sub, username);
        return Ok(redirect_with_flash(
            jar,
            &format!("/users/{username}"),
            "You can only delete your own account",
        ));
    }

    let db = state.clone();
    let target = username.clone();
    let removed = blocking(move || db.db.delete_user(&target))
        .await?
        .ok_or(AppError::NotFound)?;

    info!("Deleted user {} and {} feedback", username, removed);
    Ok(redirect_with_flash(clear_session(jar), "/", "Your account has been deleted"))
}

/// 404 unless `username` is registered.
pub(crate) async fn require_user(state: &AppState, username: &str) -> Result<(), AppError> {
    let db = state.clone();
    let username = username.to_string();
    let exists = blocking(move || Ok(db.db.get_user(&username)?.is_some())).await?;
    if exists { Ok(()) } else { Err(AppError::NotFound) }
}
