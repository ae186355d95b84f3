use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, Validation, decode};

use feedback_types::api::Claims;

use crate::auth::AppState;
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "session";
pub const FLASH_COOKIE: &str = "flash";

/// Validate the session cookie and hand its claims to the handler as an
/// `Extension<Claims>`. Missing or invalid sessions go back to the login page.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| decode_token(&state.jwt_secret, cookie.value()))
        .ok_or(AppError::LoginRequired)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Signature and expiry are both checked.
pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

// -- Cookies --

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Queue a one-shot notice for the next rendered page.
pub fn set_flash(jar: CookieJar, message: &str) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, message.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Read and clear the pending notice, if any.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    match jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) {
        Some(message) => (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), Some(message)),
        None => (jar, None),
    }
}

pub fn redirect_with_flash(jar: CookieJar, to: &str, message: &str) -> Response {
    (set_flash(jar, message), Redirect::to(to)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::create_token;

    #[test]
    fn token_roundtrip() {
        let token = create_token("secret", "alice", chrono::Duration::hours(1)).unwrap();
        let claims = decode_token("secret", &token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let token = create_token("secret", "alice", chrono::Duration::hours(1)).unwrap();
        assert!(decode_token("other-secret", &token).is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_token("secret", "alice", chrono::Duration::hours(-1)).unwrap();
        assert!(decode_token("secret", &token).is_none());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = create_token("secret", "alice", chrono::Duration::hours(1)).unwrap();
        let forged = create_token("attacker", "bob", chrono::Duration::hours(1)).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged.split('.').nth(1).unwrap();
        assert!(decode_token("secret", &parts.join(".")).is_none());
    }

    #[test]
    fn flash_is_taken_once() {
        let jar = set_flash(CookieJar::new(), "hello");
        let (jar, message) = take_flash(jar);
        assert_eq!(message.as_deref(), Some("hello"));

        let (_jar, message) = take_flash(jar);
        assert!(message.is_none());
    }
}
