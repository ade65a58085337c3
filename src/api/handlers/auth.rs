use crate::{
    api::validation::{validate_login, validate_register},
    auth::{expired_session_cookie, middleware::CurrentUser, session_cookie},
    types::{
        AppError, LoginRequest, MessageResponse, RegisterRequest, Result, User, UserResponse,
    },
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;

/// Issues a session token for the user and binds it to the transport
/// cookie. The response body carries only the public user projection; the
/// password never appears in any response or log line.
fn respond_with_session(
    state: &AppState,
    jar: CookieJar,
    user: &User,
    status: StatusCode,
    message: &str,
) -> Result<(StatusCode, CookieJar, Json<UserResponse>)> {
    let token = state.auth_service.issue_token(&user.id)?;
    let cookie = session_cookie(
        token,
        state.auth_service.token_expiry(),
        state.config.server.is_production(),
    );

    Ok((
        status,
        jar.add(cookie),
        Json(UserResponse {
            success: true,
            message: Some(message.to_string()),
            user: user.public(),
        }),
    ))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, session cookie set", body = UserResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserResponse>)> {
    let valid = validate_register(&payload)?;

    if state.store.get_user_by_email(&valid.email).await?.is_some() {
        return Err(AppError::Conflict(
            "Email already registered. Please login.".to_string(),
        ));
    }

    // The plaintext password is dropped here; only the hash is persisted.
    let password_hash = state.auth_service.hash_password(&valid.password)?;
    let user = state
        .store
        .create_user(&valid.name, &valid.email, &password_hash)
        .await?;

    tracing::info!(user_id = %user.id, "user registered");

    respond_with_session(
        &state,
        jar,
        &user,
        StatusCode::CREATED,
        "Account created successfully",
    )
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = UserResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserResponse>)> {
    let valid = validate_login(&payload)?;

    // Unknown email and wrong password share one message.
    let user = state
        .store
        .get_user_by_email(&valid.email)
        .await?
        .ok_or_else(|| AppError::InvalidCredentials("Invalid email or password".to_string()))?;

    if !state
        .auth_service
        .verify_password(&valid.password, &user.password_hash)?
    {
        return Err(AppError::InvalidCredentials(
            "Invalid email or password".to_string(),
        ));
    }

    respond_with_session(&state, jar, &user, StatusCode::OK, "Logged in successfully")
}

/// Logout by overwriting the session cookie with an expired one
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let cookie = expired_session_cookie(state.config.server.is_production());

    (
        jar.add(cookie),
        Json(MessageResponse {
            success: true,
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// Get the current logged-in user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth"
)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse {
        success: true,
        message: None,
        user: user.public(),
    })
}
