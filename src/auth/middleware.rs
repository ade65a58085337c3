use crate::auth::SESSION_COOKIE;
use crate::types::{AppError, Result, User};
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

/// Guards protected routes.
///
/// Reads the session cookie, verifies the token, and resolves the claims to
/// a live user record. The three failure modes answer 401 with distinct
/// generic messages: no cookie, bad/expired token, and an account that was
/// removed after the token was issued. None of them reveal whether a given
/// email is registered.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| AppError::Unauthenticated("Not authorized. Please login.".to_string()))?;

    let claims = state.auth_service.verify_token(&token).map_err(|_| {
        AppError::Unauthenticated("Not authorized. Token invalid or expired.".to_string())
    })?;

    let user = state
        .store
        .get_user_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("User no longer exists.".to_string()))?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// Extractor for the authenticated user resolved by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated("Not authorized. Please login.".to_string()))
    }
}
