use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::models::CategoryDetail;
use crate::database::repository::EMPTY_UPDATE;
use crate::database::StoreError;

const CATEGORY_SELECT: &str = "SELECT c.id, c.name, c.description, c.is_active, \
    COALESCE(array_agg(pc.post_id ORDER BY pc.post_id) \
        FILTER (WHERE pc.post_id IS NOT NULL), ARRAY[]::bigint[]) AS post_ids \
    FROM categories c LEFT JOIN post_category pc ON pc.category_id = c.id";

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl CategoryChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.is_active.is_none()
    }
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<CategoryDetail>, StoreError> {
    let categories = sqlx::query_as::<_, CategoryDetail>(&format!(
        "{} GROUP BY c.id ORDER BY c.id",
        CATEGORY_SELECT
    ))
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

pub async fn get_by_id(pool: &PgPool, id: i64) -> Result<CategoryDetail, StoreError> {
    sqlx::query_as::<_, CategoryDetail>(&format!(
        "{} WHERE c.id = $1 GROUP BY c.id",
        CATEGORY_SELECT
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::NotFound("Category not found".to_string()))
}

pub async fn create(pool: &PgPool, new_category: NewCategory) -> Result<CategoryDetail, StoreError> {
    let mut tx = pool.begin().await?;
    let (id, name, description, is_active): (i64, String, String, bool) = sqlx::query_as(
        "INSERT INTO categories (name, description, is_active) VALUES ($1, $2, $3) \
         RETURNING id, name, description, is_active",
    )
    .bind(&new_category.name)
    .bind(&new_category.description)
    .bind(new_category.is_active)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(CategoryDetail {
        id,
        name,
        description,
        is_active,
        post_ids: Vec::new(),
    })
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    changes: CategoryChanges,
) -> Result<CategoryDetail, StoreError> {
    if changes.is_empty() {
        return Err(StoreError::InvalidRequest(EMPTY_UPDATE.to_string()));
    }

    let mut tx = pool.begin().await?;

    let mut query = QueryBuilder::<Postgres>::new("UPDATE categories SET ");
    let mut fields = query.separated(", ");
    if let Some(name) = &changes.name {
        fields.push("name = ");
        fields.push_bind_unseparated(name);
    }
    if let Some(description) = &changes.description {
        fields.push("description = ");
        fields.push_bind_unseparated(description);
    }
    if let Some(is_active) = changes.is_active {
        fields.push("is_active = ");
        fields.push_bind_unseparated(is_active);
    }
    query.push(" WHERE id = ");
    query.push_bind(id);
    query.push(" RETURNING id");

    query
        .build()
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound("Category not found".to_string()))?;

    tx.commit().await?;
    get_by_id(pool, id).await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<String, StoreError> {
    let mut tx = pool.begin().await?;
    // Association rows go with the category (ON DELETE CASCADE)
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("Category not found".to_string()));
    }
    tx.commit().await?;
    Ok(format!("Category {} has been deleted", id))
}
