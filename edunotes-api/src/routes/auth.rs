/// Authentication endpoints
///
/// - `POST /auth/register` - Register a new user
/// - `POST /auth/login` - Exchange username (or email) and password for an access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{ApiResponse, AppJson},
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Duration;
use edunotes_shared::{
    auth::{jwt, password},
    error::is_unique_violation,
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const CREDENTIALS_TAKEN: &str = "Username or email already registered";
pub const INVALID_LOGIN: &str = "Invalid username or password";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
}

/// Login request
///
/// `username` accepts either the username or the email address.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// OAuth2-style token response (not enveloped)
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Register a new user
///
/// New users start at score 0 with the lowest rank.
///
/// # Errors
///
/// - `400 Bad Request`: username or email already registered
/// - `422 Unprocessable Entity`: validation failed
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> ApiResult<(StatusCode, ApiResponse<User>)> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username.trim().to_string(),
            email: req.email.trim().to_string(),
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
        },
    )
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            ApiError::Conflict(CREDENTIALS_TAKEN.to_string())
        } else {
            ApiError::from(err)
        }
    })?;

    tracing::info!(user_id = user.user_id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("User registered successfully", user),
    ))
}

/// Login and get an access token
///
/// # Errors
///
/// - `401 Unauthorized`: unknown user or wrong password (same detail for both)
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = User::find_by_login(&state.db, req.username.trim())
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_LOGIN.to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = user.user_id, "Login rejected");
        return Err(ApiError::Unauthorized(INVALID_LOGIN.to_string()));
    }

    let claims = jwt::Claims::new(
        user.user_id,
        &user.username,
        &user.email,
        Duration::minutes(state.config.jwt.expiration_minutes),
    );
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = user.user_id, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
