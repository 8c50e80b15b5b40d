use axum::extract::{Path, State};
use axum::response::Json;
use serde::Deserialize;

use crate::database::models::PostDetail;
use crate::database::repository::posts;
use crate::error::ApiError;
use crate::handlers::validate::{
    check_max_len, ensure_valid, require_non_empty, FieldErrors, SLUG_MAX, TITLE_MAX,
};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub slug: String,
    #[serde(default)]
    pub categories: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    pub categories: Option<Vec<i64>>,
}

/// GET /posts/ - list all posts with author and categories
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<PostDetail>> {
    let posts = posts::list_all(&state.pool).await?;
    Ok(ApiResponse::success(posts))
}

/// GET /posts/:id - get a single post
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<PostDetail> {
    let post = posts::get_by_id(&state.pool, id).await?;
    Ok(ApiResponse::success(post))
}

/// POST /posts/ - create a post; the authenticated caller becomes the author
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> ApiResult<PostDetail> {
    let mut errors = FieldErrors::new();
    require_non_empty(&mut errors, "title", &payload.title);
    require_non_empty(&mut errors, "slug", &payload.slug);
    check_max_len(&mut errors, "title", &payload.title, TITLE_MAX);
    check_max_len(&mut errors, "slug", &payload.slug, SLUG_MAX);
    ensure_valid(errors)?;

    let post = posts::create(
        &state.pool,
        posts::NewPost {
            title: payload.title,
            summary: payload.summary,
            content: payload.content,
            slug: payload.slug,
            author_id: auth.user_id,
            categories: payload.categories,
        },
    )
    .await?;

    tracing::info!("User {} created post {}", auth.user_id, post.id);
    Ok(ApiResponse::created(post))
}

/// PATCH /posts/:id - partial update; categories replace the existing set
/// when present. Any authenticated caller may update any post.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePostRequest>,
) -> ApiResult<PostDetail> {
    if payload.title.is_none()
        && payload.summary.is_none()
        && payload.content.is_none()
        && payload.slug.is_none()
        && payload.categories.is_none()
    {
        return Err(ApiError::bad_request(
            "At least one valid field must be provided for update",
        ));
    }

    let mut errors = FieldErrors::new();
    if let Some(title) = &payload.title {
        check_max_len(&mut errors, "title", title, TITLE_MAX);
    }
    if let Some(slug) = &payload.slug {
        check_max_len(&mut errors, "slug", slug, SLUG_MAX);
    }
    ensure_valid(errors)?;

    let post = posts::update(
        &state.pool,
        id,
        posts::PostChanges {
            title: payload.title,
            summary: payload.summary,
            content: payload.content,
            slug: payload.slug,
            categories: payload.categories,
        },
    )
    .await?;

    tracing::info!("User {} updated post {}", auth.user_id, id);
    Ok(ApiResponse::success(post))
}

/// DELETE /posts/:id - delete a post and its association rows
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<String> {
    let confirmation = posts::delete(&state.pool, id).await?;
    tracing::info!("User {} deleted post {}", auth.user_id, id);
    Ok(ApiResponse::success(confirmation))
}
