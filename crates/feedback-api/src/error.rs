use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use thiserror::Error;
use tracing::error;

use crate::credentials::AuthError;
use crate::middleware::set_flash;
use crate::pages;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    /// No valid session on a protected route.
    #[error("Login required")]
    LoginRequired,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Internal(e) => AppError::Internal(e),
            other => AppError::Internal(anyhow::anyhow!(other.to_string())),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, Html(pages::not_found())).into_response(),
            AppError::LoginRequired => {
                let jar = set_flash(CookieJar::new(), "Please log in or register");
                (jar, Redirect::to("/login")).into_response()
            }
            AppError::Internal(e) => {
                error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, Html(pages::server_error())).into_response()
            }
        }
    }
}
