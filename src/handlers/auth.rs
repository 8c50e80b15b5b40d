use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::database::models::UserRead;
use crate::database::repository::users;
use crate::error::ApiError;
use crate::handlers::validate::{
    check_email, check_max_len, ensure_valid, require_non_empty, FieldErrors, EMAIL_MAX,
    USERNAME_MAX,
};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const BAD_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// POST /users/auth/register - create a new user account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<UserRead> {
    let mut errors = FieldErrors::new();
    require_non_empty(&mut errors, "email", &payload.email);
    require_non_empty(&mut errors, "username", &payload.username);
    require_non_empty(&mut errors, "password", &payload.password);
    check_max_len(&mut errors, "email", &payload.email, EMAIL_MAX);
    check_max_len(&mut errors, "username", &payload.username, USERNAME_MAX);
    if !payload.email.trim().is_empty() {
        check_email(&mut errors, "email", &payload.email);
    }
    ensure_valid(errors)?;

    let hashed_password =
        hash_password(&payload.password).map_err(ApiError::internal_server_error)?;

    let user = users::create(
        &state.pool,
        users::NewUser {
            email: payload.email,
            username: payload.username,
            hashed_password,
        },
    )
    .await?;

    tracing::info!("Registered user {} ({})", user.username, user.id);
    Ok(ApiResponse::created(user))
}

/// POST /users/auth/jwt/login - verify credentials and issue a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let user = users::find_by_username(&state.pool, &payload.username)
        .await?
        .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;

    if !verify_password(&payload.password, &user.hashed_password) {
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }
    if !user.is_active {
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let claims = Claims::new(user.id, user.username.clone());
    let access_token = generate_jwt(&claims)?;

    tracing::info!("Issued token for user {} ({})", user.username, user.id);
    Ok(ApiResponse::success(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: config::config().security.jwt_lifetime_secs,
    }))
}
