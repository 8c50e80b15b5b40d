use axum::extract::{Path, State};
use axum::response::Json;
use serde::Deserialize;

use crate::database::models::CategoryDetail;
use crate::database::repository::categories;
use crate::error::ApiError;
use crate::handlers::validate::{
    check_max_len, ensure_valid, require_non_empty, FieldErrors, CATEGORY_DESCRIPTION_MAX,
    CATEGORY_NAME_MAX,
};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

fn default_is_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: String,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /categories/ - list all categories. Unlike posts, every category
/// endpoint requires an authenticated caller.
pub async fn list(State(state): State<AppState>, _auth: AuthUser) -> ApiResult<Vec<CategoryDetail>> {
    let categories = categories::list_all(&state.pool).await?;
    Ok(ApiResponse::success(categories))
}

/// GET /categories/:id - get a single category
pub async fn get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<CategoryDetail> {
    let category = categories::get_by_id(&state.pool, id).await?;
    Ok(ApiResponse::success(category))
}

/// POST /categories/ - create a category
pub async fn create(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<CategoryDetail> {
    let mut errors = FieldErrors::new();
    require_non_empty(&mut errors, "name", &payload.name);
    check_max_len(&mut errors, "name", &payload.name, CATEGORY_NAME_MAX);
    check_max_len(
        &mut errors,
        "description",
        &payload.description,
        CATEGORY_DESCRIPTION_MAX,
    );
    ensure_valid(errors)?;

    let category = categories::create(
        &state.pool,
        categories::NewCategory {
            name: payload.name,
            description: payload.description,
            is_active: payload.is_active,
        },
    )
    .await?;
    Ok(ApiResponse::created(category))
}

/// PATCH /categories/:id - partial update
pub async fn update(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> ApiResult<CategoryDetail> {
    if payload.name.is_none() && payload.description.is_none() && payload.is_active.is_none() {
        return Err(ApiError::bad_request(
            "At least one valid field must be provided for update",
        ));
    }

    let mut errors = FieldErrors::new();
    if let Some(name) = &payload.name {
        check_max_len(&mut errors, "name", name, CATEGORY_NAME_MAX);
    }
    if let Some(description) = &payload.description {
        check_max_len(
            &mut errors,
            "description",
            description,
            CATEGORY_DESCRIPTION_MAX,
        );
    }
    ensure_valid(errors)?;

    let category = categories::update(
        &state.pool,
        id,
        categories::CategoryChanges {
            name: payload.name,
            description: payload.description,
            is_active: payload.is_active,
        },
    )
    .await?;
    Ok(ApiResponse::success(category))
}

/// DELETE /categories/:id - delete a category and its association rows
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<String> {
    let confirmation = categories::delete(&state.pool, id).await?;
    Ok(ApiResponse::success(confirmation))
}
