use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

/// Category with the ids of the posts linked through the association table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryDetail {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub post_ids: Vec<i64>,
}
