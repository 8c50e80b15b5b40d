use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::models::{User, UserRead};
use crate::database::repository::EMPTY_UPDATE;
use crate::database::StoreError;

const USER_COLUMNS: &str = "id, email, username, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub hashed_password: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub hashed_password: Option<String>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.hashed_password.is_none()
            && self.is_active.is_none()
    }
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<UserRead>, StoreError> {
    let users = sqlx::query_as::<_, UserRead>(&format!(
        "SELECT {} FROM users ORDER BY id",
        USER_COLUMNS
    ))
    .fetch_all(pool)
    .await?;
    Ok(users)
}

pub async fn get_by_id(pool: &PgPool, id: i64) -> Result<UserRead, StoreError> {
    sqlx::query_as::<_, UserRead>(&format!(
        "SELECT {} FROM users WHERE id = $1",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::NotFound("User not found".to_string()))
}

/// Full row lookup for credential verification. Returns `None` rather than
/// `NotFound` so login can fail uniformly without leaking which part was wrong.
pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, username, hashed_password, is_active, created_at, updated_at \
         FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn create(pool: &PgPool, new_user: NewUser) -> Result<UserRead, StoreError> {
    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<_, UserRead>(&format!(
        "INSERT INTO users (email, username, hashed_password) VALUES ($1, $2, $3) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(&new_user.email)
    .bind(&new_user.username)
    .bind(&new_user.hashed_password)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(user)
}

pub async fn update(pool: &PgPool, id: i64, changes: UserChanges) -> Result<UserRead, StoreError> {
    if changes.is_empty() {
        return Err(StoreError::InvalidRequest(EMPTY_UPDATE.to_string()));
    }

    let mut tx = pool.begin().await?;

    let mut query = QueryBuilder::<Postgres>::new("UPDATE users SET ");
    let mut fields = query.separated(", ");
    if let Some(email) = &changes.email {
        fields.push("email = ");
        fields.push_bind_unseparated(email);
    }
    if let Some(username) = &changes.username {
        fields.push("username = ");
        fields.push_bind_unseparated(username);
    }
    if let Some(hashed_password) = &changes.hashed_password {
        fields.push("hashed_password = ");
        fields.push_bind_unseparated(hashed_password);
    }
    if let Some(is_active) = changes.is_active {
        fields.push("is_active = ");
        fields.push_bind_unseparated(is_active);
    }
    fields.push("updated_at = now()");
    query.push(" WHERE id = ");
    query.push_bind(id);
    query.push(format!(" RETURNING {}", USER_COLUMNS));

    let user = query
        .build_query_as::<UserRead>()
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound("User not found".to_string()))?;

    tx.commit().await?;
    Ok(user)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<String, StoreError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("User not found".to_string()));
    }
    tx.commit().await?;
    Ok(format!("User {} has been deleted", id))
}
