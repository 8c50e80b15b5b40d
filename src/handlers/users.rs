use axum::extract::{Path, State};
use axum::response::Json;
use serde::Deserialize;

use crate::auth::password::hash_password;
use crate::database::models::UserRead;
use crate::database::repository::users;
use crate::error::ApiError;
use crate::handlers::validate::{
    check_email, check_max_len, ensure_valid, require_non_empty, FieldErrors, EMAIL_MAX,
    USERNAME_MAX,
};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /users/ - list all users
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<UserRead>> {
    let users = users::list_all(&state.pool).await?;
    Ok(ApiResponse::success(users))
}

/// GET /users/me - the caller's own profile
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<UserRead> {
    let user = users::get_by_id(&state.pool, auth.user_id).await?;
    Ok(ApiResponse::success(user))
}

/// GET /users/:id - get a single user
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<UserRead> {
    let user = users::get_by_id(&state.pool, id).await?;
    Ok(ApiResponse::success(user))
}

/// PATCH /users/:id - partial profile update
pub async fn update(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<UserRead> {
    if payload.email.is_none()
        && payload.username.is_none()
        && payload.password.is_none()
        && payload.is_active.is_none()
    {
        return Err(ApiError::bad_request(
            "At least one valid field must be provided for update",
        ));
    }

    let mut errors = FieldErrors::new();
    if let Some(email) = &payload.email {
        require_non_empty(&mut errors, "email", email);
        check_max_len(&mut errors, "email", email, EMAIL_MAX);
        if !email.trim().is_empty() {
            check_email(&mut errors, "email", email);
        }
    }
    if let Some(username) = &payload.username {
        require_non_empty(&mut errors, "username", username);
        check_max_len(&mut errors, "username", username, USERNAME_MAX);
    }
    if let Some(password) = &payload.password {
        require_non_empty(&mut errors, "password", password);
    }
    ensure_valid(errors)?;

    let hashed_password = match &payload.password {
        Some(password) => Some(hash_password(password).map_err(ApiError::internal_server_error)?),
        None => None,
    };

    let user = users::update(
        &state.pool,
        id,
        users::UserChanges {
            email: payload.email,
            username: payload.username,
            hashed_password,
            is_active: payload.is_active,
        },
    )
    .await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /users/:id - delete a user; blocked by the store while posts
/// still reference them
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<String> {
    let confirmation = users::delete(&state.pool, id).await?;
    Ok(ApiResponse::success(confirmation))
}
