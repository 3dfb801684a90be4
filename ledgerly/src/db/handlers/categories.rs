//! Database repository for categories.

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    api::models::categories::CategorySort,
    api::models::normalize_search,
    db::{
        errors::{DbError, Result},
        handlers::repository::OwnedRepository,
        models::categories::{Category, CategoryCreateDBRequest, CategoryUpdateDBRequest},
    },
    types::{CategoryId, UserId, abbrev_uuid},
};

/// Filter for listing categories.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub search: Option<String>,
    pub kind: Option<crate::api::models::categories::CategoryKind>,
    pub sort: CategorySort,
}

pub struct Categories<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Categories<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Whether any transfers still reference this category.
    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&id)), err)]
    pub async fn is_referenced(&mut self, owner: UserId, id: CategoryId) -> Result<bool> {
        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM transfers WHERE category_id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(referenced)
    }
}

#[async_trait::async_trait]
impl<'c> OwnedRepository for Categories<'c> {
    type CreateRequest = CategoryCreateDBRequest;
    type UpdateRequest = CategoryUpdateDBRequest;
    type Response = Category;
    type Id = CategoryId;
    type Filter = CategoryFilter;

    #[instrument(skip(self, request), fields(owner = %abbrev_uuid(&owner)), err)]
    async fn create(&mut self, owner: UserId, request: &Self::CreateRequest) -> Result<Self::Response> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (user_id, name, description, kind)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(owner)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.kind)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(category)
    }

    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, owner: UserId, id: Self::Id) -> Result<Option<Self::Response>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(category)
    }

    #[instrument(skip(self, filter), fields(owner = %abbrev_uuid(&owner)), err)]
    async fn list(&mut self, owner: UserId, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = sqlx::QueryBuilder::new("SELECT * FROM categories WHERE user_id = ");
        query.push_bind(owner);

        if let Some(search) = normalize_search(filter.search.as_deref()) {
            let pattern = format!("%{search}%");
            query.push(" AND (name ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR description ILIKE ");
            query.push_bind(pattern);
            query.push(")");
        }

        if let Some(kind) = filter.kind {
            query.push(" AND kind = ");
            query.push_bind(kind);
        }

        query.push(" ORDER BY ");
        query.push(filter.sort.order_clause());

        let categories = query.build_query_as::<Category>().fetch_all(&mut *self.db).await?;

        Ok(categories)
    }

    #[instrument(skip(self, request), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, owner: UserId, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $3, description = $4, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&request.name)
        .bind(&request.description)
        .fetch_optional(&mut *self.db)
        .await?;

        category.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, owner: UserId, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
