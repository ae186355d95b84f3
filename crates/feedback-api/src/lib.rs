pub mod auth;
pub mod credentials;
pub mod error;
pub mod feedback;
pub mod middleware;
pub mod pages;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};
use tracing::error;

use crate::auth::AppState;
use crate::error::AppError;

/// Every route the application serves. Routes under `/users` require a
/// valid session cookie.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(users::index))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/health", get(users::health));

    let protected_routes = Router::new()
        .route("/users/{username}", get(users::show_user))
        .route("/users/{username}/delete", get(users::delete_user))
        .route(
            "/users/{username}/feedback/add",
            get(feedback::add_feedback_page).post(feedback::add_feedback),
        )
        .route(
            "/users/feedback/{id}/update",
            get(feedback::edit_feedback_page).post(feedback::edit_feedback),
        )
        .route("/users/feedback/{id}/delete", post(feedback::delete_feedback))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_session,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Run blocking database or hashing work off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    blocking_result(f).await?.map_err(AppError::from)
}

/// Like [`blocking`], but hands the closure's own error back untouched so
/// the caller can match on it. Only a failed join becomes an `AppError`.
pub(crate) async fn blocking_result<F, T, E>(f: F) -> Result<Result<T, E>, AppError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        AppError::Internal(anyhow::anyhow!("blocking task failed"))
    })
}
