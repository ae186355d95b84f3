use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

use feedback_db::models::FeedbackRow;
use feedback_types::api::{Claims, FeedbackForm};

use crate::auth::AppState;
use crate::error::AppError;
use crate::middleware::redirect_with_flash;
use crate::users::require_user;
use crate::{blocking, pages};

/// GET /users/{username}/feedback/add
pub async fn add_feedback_page(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    require_user(&state, &username).await?;
    if claims.sub != username {
        return Ok(not_yours(jar, &username));
    }

    let action = format!("/users/{username}/feedback/add");
    let page = pages::feedback_form_page("Add feedback", &action, &username, &FeedbackForm::default(), None);
    Ok(Html(page).into_response())
}

/// POST /users/{username}/feedback/add
pub async fn add_feedback(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
    Form(form): Form<FeedbackForm>,
) -> Result<Response, AppError> {
    require_user(&state, &username).await?;
    if claims.sub != username {
        warn!("{} tried to add feedback for {}", claims.sub, username);
        return Ok(not_yours(jar, &username));
    }

    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => {
            let action = format!("/users/{username}/feedback/add");
            let page = pages::feedback_form_page("Add feedback", &action, &username, &form, Some(&e));
            return Ok(Html(page).into_response());
        }
    };

    let db = state.clone();
    let owner = username.clone();
    let id = blocking(move || db.db.insert_feedback(&owner, &input.title, &input.content)).await?;

    info!("{} added feedback {}", username, id);
    Ok(Redirect::to(&format!("/users/{username}")).into_response())
}

/// GET /users/feedback/{id}/update
pub async fn edit_feedback_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let id = feedback_id(&id)?;
    let row = require_feedback(&state, id).await?;
    if claims.sub != row.username {
        return Ok(redirect_with_flash(
            jar,
            &format!("/users/{}", row.username),
            "Only the author can edit this feedback",
        ));
    }

    let form = FeedbackForm {
        title: row.title,
        content: row.content,
    };
    let action = format!("/users/feedback/{id}/update");
    let page = pages::feedback_form_page("Edit feedback", &action, &row.username, &form, None);
    Ok(Html(page).into_response())
}

/// POST /users/feedback/{id}/update
pub async fn edit_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
    Form(form): Form<FeedbackForm>,
) -> Result<Response, AppError> {
    let id = feedback_id(&id)?;
    let row = require_feedback(&state, id).await?;
    if claims.sub != row.username {
        warn!("{} tried to edit feedback {} owned by {}", claims.sub, id, row.username);
        return Ok(redirect_with_flash(
            jar,
            &format!("/users/{}", row.username),
            "Only the author can edit this feedback",
        ));
    }

    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => {
            let action = format!("/users/feedback/{id}/update");
            let page = pages::feedback_form_page("Edit feedback", &action, &row.username, &form, Some(&e));
            return Ok(Html(page).into_response());
        }
    };

    let db = state.clone();
    let updated = blocking(move || db.db.update_feedback(id, &input.title, &input.content)).await?;
    if !updated {
        return Err(AppError::NotFound);
    }

    info!("{} updated feedback {}", row.username, id);
    Ok(Redirect::to(&format!("/users/{}", row.username)).into_response())
}

/// POST /users/feedback/{id}/delete
pub async fn delete_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let id = feedback_id(&id)?;
    let row = require_feedback(&state, id).await?;
    if claims.sub != row.username {
        warn!("{} tried to delete feedback {} owned by {}", claims.sub, id, row.username);
        return Ok(redirect_with_flash(
            jar,
            &format!("/users/{}", row.username),
            "Only the author can delete this feedback",
        ));
    }

    let db = state.clone();
    if !blocking(move || db.db.delete_feedback(id)).await? {
        return Err(AppError::NotFound);
    }

    info!("{} deleted feedback {}", row.username, id);
    Ok(Redirect::to(&format!("/users/{}", row.username)).into_response())
}

// -- Helpers --

/// Ids come in as raw path text so a non-numeric id renders the same 404 as
/// a missing one instead of axum's plain-text rejection.
fn feedback_id(raw: &str) -> Result<i64, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

async fn require_feedback(state: &AppState, id: i64) -> Result<FeedbackRow, AppError> {
    let db = state.clone();
    blocking(move || db.db.get_feedback(id))
        .await?
        .ok_or(AppError::NotFound)
}

fn not_yours(jar: CookieJar, username: &str) -> Response {
    redirect_with_flash(
        jar,
        &format!("/users/{username}"),
        &format!("You can only add feedback for {username}"),
    )
}
