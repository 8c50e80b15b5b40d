use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::database::models::{Category, PostDetail, UserRead};
use crate::database::repository::EMPTY_UPDATE;
use crate::database::StoreError;

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub slug: String,
    pub author_id: i64,
    pub categories: Vec<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    /// When present, replaces the post's category set wholesale.
    pub categories: Option<Vec<i64>>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.summary.is_none()
            && self.content.is_none()
            && self.slug.is_none()
            && self.categories.is_none()
    }

    fn has_column_changes(&self) -> bool {
        self.title.is_some()
            || self.summary.is_some()
            || self.content.is_some()
            || self.slug.is_some()
    }
}

/// Post joined with its author in a single flat row.
#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    title: String,
    summary: String,
    content: String,
    slug: String,
    author_id: i64,
    author_email: String,
    author_username: String,
    author_is_active: bool,
    author_created_at: DateTime<Utc>,
    author_updated_at: DateTime<Utc>,
}

const POST_SELECT: &str = "SELECT p.id, p.title, p.summary, p.content, p.slug, \
    p.author_id, u.email AS author_email, u.username AS author_username, \
    u.is_active AS author_is_active, u.created_at AS author_created_at, \
    u.updated_at AS author_updated_at \
    FROM posts p JOIN users u ON u.id = p.author_id";

impl PostRow {
    fn into_detail(self, categories: Vec<Category>) -> PostDetail {
        PostDetail {
            id: self.id,
            title: self.title,
            summary: self.summary,
            content: self.content,
            slug: self.slug,
            author: UserRead {
                id: self.author_id,
                email: self.author_email,
                username: self.author_username,
                is_active: self.author_is_active,
                created_at: self.author_created_at,
                updated_at: self.author_updated_at,
            },
            categories,
        }
    }
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<PostDetail>, StoreError> {
    let rows = sqlx::query_as::<_, PostRow>(&format!("{} ORDER BY p.id", POST_SELECT))
        .fetch_all(pool)
        .await?;

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut categories = categories_by_post(pool, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let cats = categories.remove(&row.id).unwrap_or_default();
            row.into_detail(cats)
        })
        .collect())
}

pub async fn get_by_id(pool: &PgPool, id: i64) -> Result<PostDetail, StoreError> {
    let row = sqlx::query_as::<_, PostRow>(&format!("{} WHERE p.id = $1", POST_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("Post not found".to_string()))?;

    let mut categories = categories_by_post(pool, &[id]).await?;
    let cats = categories.remove(&id).unwrap_or_default();
    Ok(row.into_detail(cats))
}

pub async fn create(pool: &PgPool, new_post: NewPost) -> Result<PostDetail, StoreError> {
    let mut tx = pool.begin().await?;

    let (post_id,): (i64,) = sqlx::query_as(
        "INSERT INTO posts (title, summary, content, slug, author_id) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(&new_post.title)
    .bind(&new_post.summary)
    .bind(&new_post.content)
    .bind(&new_post.slug)
    .bind(new_post.author_id)
    .fetch_one(&mut *tx)
    .await?;

    if !new_post.categories.is_empty() {
        insert_associations(&mut tx, post_id, &new_post.categories).await?;
    }

    tx.commit().await?;
    get_by_id(pool, post_id).await
}

pub async fn update(pool: &PgPool, id: i64, changes: PostChanges) -> Result<PostDetail, StoreError> {
    if changes.is_empty() {
        return Err(StoreError::InvalidRequest(EMPTY_UPDATE.to_string()));
    }

    let mut tx = pool.begin().await?;

    if changes.has_column_changes() {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE posts SET ");
        let mut fields = query.separated(", ");
        if let Some(title) = &changes.title {
            fields.push("title = ");
            fields.push_bind_unseparated(title);
        }
        if let Some(summary) = &changes.summary {
            fields.push("summary = ");
            fields.push_bind_unseparated(summary);
        }
        if let Some(content) = &changes.content {
            fields.push("content = ");
            fields.push_bind_unseparated(content);
        }
        if let Some(slug) = &changes.slug {
            fields.push("slug = ");
            fields.push_bind_unseparated(slug);
        }
        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" RETURNING id");

        query
            .build()
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound("Post not found".to_string()))?;
    } else {
        sqlx::query("SELECT id FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound("Post not found".to_string()))?;
    }

    if let Some(categories) = &changes.categories {
        sqlx::query("DELETE FROM post_category WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if !categories.is_empty() {
            insert_associations(&mut tx, id, categories).await?;
        }
    }

    tx.commit().await?;
    get_by_id(pool, id).await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<String, StoreError> {
    let mut tx = pool.begin().await?;
    // Association rows go with the post (ON DELETE CASCADE)
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("Post not found".to_string()));
    }
    tx.commit().await?;
    Ok(format!("Post {} has been deleted", id))
}

async fn insert_associations(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    post_id: i64,
    category_ids: &[i64],
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO post_category (post_id, category_id) \
         SELECT $1, unnest($2::bigint[])",
    )
    .bind(post_id)
    .bind(category_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// One grouped query for the categories of a set of posts; avoids per-post
/// round trips when listing.
async fn categories_by_post(
    pool: &PgPool,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<Category>>, StoreError> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i64, Category)> = sqlx::query_as::<_, (i64, i64, String, String, bool)>(
        "SELECT pc.post_id, c.id, c.name, c.description, c.is_active \
         FROM post_category pc JOIN categories c ON c.id = pc.category_id \
         WHERE pc.post_id = ANY($1) ORDER BY c.id",
    )
    .bind(post_ids)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(post_id, id, name, description, is_active)| {
        (
            post_id,
            Category {
                id,
                name,
                description,
                is_active,
            },
        )
    })
    .collect();

    let mut grouped: HashMap<i64, Vec<Category>> = HashMap::new();
    for (post_id, category) in rows {
        grouped.entry(post_id).or_default().push(category);
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_changes_detected() {
        assert!(PostChanges::default().is_empty());
        let only_categories = PostChanges {
            categories: Some(vec![]),
            ..Default::default()
        };
        assert!(!only_categories.is_empty());
        assert!(!only_categories.has_column_changes());
    }
}
