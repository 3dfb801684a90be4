//! Database models for categories.

use chrono::{DateTime, Utc};

use crate::{
    api::models::categories::CategoryKind,
    types::{CategoryId, UserId},
};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub kind: CategoryKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database request for creating a category. The kind is set once here and
/// never changes afterwards.
#[derive(Debug, Clone)]
pub struct CategoryCreateDBRequest {
    pub name: String,
    pub description: Option<String>,
    pub kind: CategoryKind,
}

/// Database request for updating a category (full replace, kind excluded).
#[derive(Debug, Clone)]
pub struct CategoryUpdateDBRequest {
    pub name: String,
    pub description: Option<String>,
}
