//! Session Authentication and Middleware
//!
//! This module provides the authentication infrastructure for the TaskVault
//! API: signed session tokens, password hashing, the cookie transport that
//! binds a token to the HTTP exchange, and the Axum middleware that guards
//! protected routes.
//!
//! # Module Structure
//!
//! - [`auth::jwt`](crate::auth::jwt) - Token issuance/verification and password hashing
//! - [`auth::middleware`](crate::auth::middleware) - Axum layer and extractor for authenticated routes
//!
//! # Security Model
//!
//! - **Password Hashing**: Argon2id (memory-hard) for secure password storage
//! - **Session Tokens**: HS256 signed tokens with configurable expiration,
//!   carried in an HTTP-only cookie so page scripts can never read them
//! - **Statelessness**: no server-side session store; logout clears the
//!   client cookie but cannot revoke an exfiltrated copy before its expiry
//!
//! # Usage
//!
//! ```ignore
//! use taskvault::auth::{jwt::AuthService, session_cookie};
//!
//! let auth = AuthService::new(config.auth.jwt_secret.clone(), config.auth.token_expiry);
//! let token = auth.issue_token(&user.id)?;
//! let cookie = session_cookie(token, auth.token_expiry(), config.server.is_production());
//! ```

/// Session token issuance, verification, and password hashing.
pub mod jwt;
/// Authentication middleware and extractor for protected routes.
pub mod middleware;

use axum_extra::extract::cookie::{Cookie, SameSite};

/// Cookie name for the session token.
pub const SESSION_COOKIE: &str = "token";

/// Builds the session cookie carrying a freshly issued token.
///
/// HTTP-only always; `Secure` and `SameSite=None` in production where the
/// frontend lives on another origin behind HTTPS, `SameSite=Lax` in
/// development. Max-Age mirrors the token validity window.
pub fn session_cookie(token: String, max_age_secs: i64, production: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(production)
        .same_site(if production {
            SameSite::None
        } else {
            SameSite::Lax
        })
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Builds the logout cookie: same attribute set, empty value, expiry in the
/// past. Purges the token from the client; a copy already exfiltrated stays
/// valid until its natural expiry.
pub fn expired_session_cookie(production: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(production)
        .same_site(if production {
            SameSite::None
        } else {
            SameSite::Lax
        })
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_hardened() {
        let cookie = session_cookie("tok".into(), 604800, false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
    }

    #[test]
    fn production_cookie_is_cross_site_capable() {
        let cookie = session_cookie("tok".into(), 604800, true);
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
    }

    #[test]
    fn logout_cookie_expires_immediately() {
        let cookie = expired_session_cookie(false);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
