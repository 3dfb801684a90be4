//! Database repository for wallets.

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    api::models::normalize_search,
    api::models::wallets::WalletSort,
    db::{
        errors::{DbError, Result},
        handlers::repository::OwnedRepository,
        models::wallets::{Wallet, WalletCreateDBRequest, WalletUpdateDBRequest},
    },
    types::{UserId, WalletId, abbrev_uuid},
};

/// Filter for listing wallets.
#[derive(Debug, Clone, Default)]
pub struct WalletFilter {
    pub search: Option<String>,
    pub sort: WalletSort,
}

pub struct Wallets<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Wallets<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Whether any transfers still reference this wallet.
    #[instrument(skip(self), fields(wallet_id = %abbrev_uuid(&id)), err)]
    pub async fn is_referenced(&mut self, owner: UserId, id: WalletId) -> Result<bool> {
        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM transfers WHERE wallet_id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(referenced)
    }
}

#[async_trait::async_trait]
impl<'c> OwnedRepository for Wallets<'c> {
    type CreateRequest = WalletCreateDBRequest;
    type UpdateRequest = WalletUpdateDBRequest;
    type Response = Wallet;
    type Id = WalletId;
    type Filter = WalletFilter;

    #[instrument(skip(self, request), fields(owner = %abbrev_uuid(&owner)), err)]
    async fn create(&mut self, owner: UserId, request: &Self::CreateRequest) -> Result<Self::Response> {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            INSERT INTO wallets (user_id, name, description, balance)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(owner)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.balance)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(wallet)
    }

    #[instrument(skip(self), fields(wallet_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, owner: UserId, id: Self::Id) -> Result<Option<Self::Response>> {
        let wallet = sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(wallet)
    }

    #[instrument(skip(self, filter), fields(owner = %abbrev_uuid(&owner)), err)]
    async fn list(&mut self, owner: UserId, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = sqlx::QueryBuilder::new("SELECT * FROM wallets WHERE user_id = ");
        query.push_bind(owner);

        if let Some(search) = normalize_search(filter.search.as_deref()) {
            let pattern = format!("%{search}%");
            query.push(" AND (name ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR description ILIKE ");
            query.push_bind(pattern);
            query.push(")");
        }

        query.push(" ORDER BY ");
        query.push(filter.sort.order_clause());

        let wallets = query.build_query_as::<Wallet>().fetch_all(&mut *self.db).await?;

        Ok(wallets)
    }

    #[instrument(skip(self, request), fields(wallet_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, owner: UserId, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            UPDATE wallets
            SET name = $3, description = $4, balance = $5, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.balance)
        .fetch_optional(&mut *self.db)
        .await?;

        wallet.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(wallet_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, owner: UserId, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM wallets WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
