use serde::{Deserialize, Serialize};

use super::category::Category;
use super::user::UserRead;

/// Post with its author and categories eagerly loaded. This is the wire shape
/// for every post endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub slug: String,
    pub author: UserRead,
    pub categories: Vec<Category>,
}
