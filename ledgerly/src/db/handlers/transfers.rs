//! Database repository for transfers.
//!
//! Reads join the category and wallet tables so responses carry the names
//! alongside the ids. The list filter is the richest in the crate; the WHERE
//! clause is composed once in [`push_filters`] and shared between the page
//! query and the unwindowed count that pagination metadata needs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::instrument;

use crate::{
    api::models::categories::CategoryKind,
    api::models::normalize_search,
    api::models::transfers::{TransferResponse, TransferSort},
    db::{
        errors::{DbError, Result},
        handlers::repository::OwnedRepository,
        models::transfers::{TransferCreateDBRequest, TransferRow, TransferUpdateDBRequest},
    },
    types::{CategoryId, TransferId, UserId, abbrev_uuid},
};

/// Joined select returning the API response shape.
const SELECT_TRANSFER: &str = r#"
    SELECT t.id, t.title, t.notes, t.amount, t.occurred_on AS date,
           t.category_id, c.name AS category_name,
           t.wallet_id, w.name AS wallet_name
    FROM transfers t
    JOIN categories c ON c.id = t.category_id
    JOIN wallets w ON w.id = t.wallet_id
"#;

/// Joined select returning the dashboard aggregation shape.
const SELECT_TRANSFER_ROW: &str = r#"
    SELECT t.id, t.title, t.notes, t.amount, t.occurred_on,
           t.category_id, c.name AS category_name, c.kind AS category_kind,
           t.wallet_id, w.name AS wallet_name
    FROM transfers t
    JOIN categories c ON c.id = t.category_id
    JOIN wallets w ON w.id = t.wallet_id
"#;

/// Filter for listing transfers. All bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct TransferFilter {
    pub search: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub kind: Option<CategoryKind>,
    pub category_id: Option<CategoryId>,
    pub sort: TransferSort,
    pub limit: i64,
    pub offset: i64,
}

/// Append the owner predicate and every active filter to `query`.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, owner: UserId, filter: &TransferFilter) {
    query.push(" WHERE t.user_id = ");
    query.push_bind(owner);

    if let Some(search) = normalize_search(filter.search.as_deref()) {
        let pattern = format!("%{search}%");
        query.push(" AND (t.title ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR t.notes ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }

    if let Some(min_amount) = filter.min_amount {
        query.push(" AND t.amount >= ");
        query.push_bind(min_amount);
    }

    if let Some(max_amount) = filter.max_amount {
        query.push(" AND t.amount <= ");
        query.push_bind(max_amount);
    }

    if let Some(min_date) = filter.min_date {
        query.push(" AND t.occurred_on >= ");
        query.push_bind(min_date);
    }

    if let Some(max_date) = filter.max_date {
        query.push(" AND t.occurred_on <= ");
        query.push_bind(max_date);
    }

    if let Some(kind) = filter.kind {
        query.push(" AND c.kind = ");
        query.push_bind(kind);
    }

    if let Some(category_id) = filter.category_id {
        query.push(" AND t.category_id = ");
        query.push_bind(category_id);
    }
}

pub struct Transfers<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Transfers<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Count the rows the filter matches, ignoring its pagination window.
    #[instrument(skip(self, filter), fields(owner = %abbrev_uuid(&owner)), err)]
    pub async fn count(&mut self, owner: UserId, filter: &TransferFilter) -> Result<i64> {
        let mut query = QueryBuilder::new(
            "SELECT COUNT(*) FROM transfers t JOIN categories c ON c.id = t.category_id JOIN wallets w ON w.id = t.wallet_id",
        );
        push_filters(&mut query, owner, filter);

        let count = query.build_query_scalar::<i64>().fetch_one(&mut *self.db).await?;

        Ok(count)
    }

    /// Every transfer the user owns, joined for aggregation, newest first.
    #[instrument(skip(self), fields(owner = %abbrev_uuid(&owner)), err)]
    pub async fn rows_for_user(&mut self, owner: UserId) -> Result<Vec<TransferRow>> {
        let mut query = QueryBuilder::new(SELECT_TRANSFER_ROW);
        query.push(" WHERE t.user_id = ");
        query.push_bind(owner);
        query.push(" ORDER BY t.occurred_on DESC, t.id DESC");

        let rows = query.build_query_as::<TransferRow>().fetch_all(&mut *self.db).await?;

        Ok(rows)
    }

    /// The user's transfers within an inclusive date range, newest first.
    #[instrument(skip(self), fields(owner = %abbrev_uuid(&owner)), err)]
    pub async fn rows_in_range(&mut self, owner: UserId, from: NaiveDate, to: NaiveDate) -> Result<Vec<TransferRow>> {
        let mut query = QueryBuilder::new(SELECT_TRANSFER_ROW);
        query.push(" WHERE t.user_id = ");
        query.push_bind(owner);
        query.push(" AND t.occurred_on >= ");
        query.push_bind(from);
        query.push(" AND t.occurred_on <= ");
        query.push_bind(to);
        query.push(" ORDER BY t.occurred_on DESC, t.id DESC");

        let rows = query.build_query_as::<TransferRow>().fetch_all(&mut *self.db).await?;

        Ok(rows)
    }
}

#[async_trait::async_trait]
impl<'c> OwnedRepository for Transfers<'c> {
    type CreateRequest = TransferCreateDBRequest;
    type UpdateRequest = TransferUpdateDBRequest;
    type Response = TransferResponse;
    type Id = TransferId;
    type Filter = TransferFilter;

    #[instrument(skip(self, request), fields(owner = %abbrev_uuid(&owner)), err)]
    async fn create(&mut self, owner: UserId, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = sqlx::query_scalar::<_, TransferId>(
            r#"
            INSERT INTO transfers (user_id, category_id, wallet_id, title, notes, amount, occurred_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(owner)
        .bind(request.category_id)
        .bind(request.wallet_id)
        .bind(&request.title)
        .bind(&request.notes)
        .bind(request.amount)
        .bind(request.occurred_on)
        .fetch_one(&mut *self.db)
        .await?;

        self.get_by_id(owner, id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(transfer_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, owner: UserId, id: Self::Id) -> Result<Option<Self::Response>> {
        let mut query = QueryBuilder::new(SELECT_TRANSFER);
        query.push(" WHERE t.id = ");
        query.push_bind(id);
        query.push(" AND t.user_id = ");
        query.push_bind(owner);

        let transfer = query
            .build_query_as::<TransferResponse>()
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(transfer)
    }

    #[instrument(skip(self, filter), fields(owner = %abbrev_uuid(&owner)), err)]
    async fn list(&mut self, owner: UserId, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new(SELECT_TRANSFER);
        push_filters(&mut query, owner, filter);

        query.push(" ORDER BY ");
        query.push(filter.sort.order_clause());

        query.push(" LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.offset);

        let transfers = query
            .build_query_as::<TransferResponse>()
            .fetch_all(&mut *self.db)
            .await?;

        Ok(transfers)
    }

    #[instrument(skip(self, request), fields(transfer_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, owner: UserId, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let updated = sqlx::query_scalar::<_, TransferId>(
            r#"
            UPDATE transfers
            SET category_id = $3, wallet_id = $4, title = $5, notes = $6,
                amount = $7, occurred_on = $8, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(request.category_id)
        .bind(request.wallet_id)
        .bind(&request.title)
        .bind(&request.notes)
        .bind(request.amount)
        .bind(request.occurred_on)
        .fetch_optional(&mut *self.db)
        .await?;

        match updated {
            Some(id) => self.get_by_id(owner, id).await?.ok_or(DbError::NotFound),
            None => Err(DbError::NotFound),
        }
    }

    #[instrument(skip(self), fields(transfer_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, owner: UserId, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transfers WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use sqlx::PgPool;

    use super::*;
    use crate::{
        db::{
            handlers::{categories::Categories, wallets::Wallets},
            models::{categories::CategoryCreateDBRequest, wallets::WalletCreateDBRequest},
        },
        test_utils::create_test_user,
    };

    fn built_sql(filter: &TransferFilter) -> String {
        let mut query = QueryBuilder::new(SELECT_TRANSFER);
        push_filters(&mut query, owner(), filter);
        query.sql().to_string()
    }

    fn owner() -> UserId {
        uuid::Uuid::nil()
    }

    #[test]
    fn test_no_filters_scope_by_owner_only() {
        let sql = built_sql(&TransferFilter::default());
        assert!(sql.contains("WHERE t.user_id = $1"));
        assert!(!sql.contains("ILIKE"));
        assert!(!sql.contains("c.kind"));
    }

    #[test]
    fn test_search_matches_title_and_notes() {
        let filter = TransferFilter {
            search: Some("rent".into()),
            ..Default::default()
        };
        let sql = built_sql(&filter);
        assert!(sql.contains("t.title ILIKE $2"));
        assert!(sql.contains("t.notes ILIKE $3"));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter = TransferFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert!(!built_sql(&filter).contains("ILIKE"));
    }

    #[test]
    fn test_all_bounds_are_inclusive() {
        let filter = TransferFilter {
            min_amount: Some(dec!(10)),
            max_amount: Some(dec!(100)),
            min_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            max_date: NaiveDate::from_ymd_opt(2026, 1, 31),
            ..Default::default()
        };
        let sql = built_sql(&filter);
        assert!(sql.contains("t.amount >= $2"));
        assert!(sql.contains("t.amount <= $3"));
        assert!(sql.contains("t.occurred_on >= $4"));
        assert!(sql.contains("t.occurred_on <= $5"));
    }

    #[test]
    fn test_kind_filters_on_joined_category() {
        let filter = TransferFilter {
            kind: Some(CategoryKind::Expense),
            ..Default::default()
        };
        assert!(built_sql(&filter).contains("c.kind = $2"));
    }

    #[test]
    fn test_category_scope_for_listing_by_category() {
        let filter = TransferFilter {
            category_id: Some(uuid::Uuid::nil()),
            ..Default::default()
        };
        assert!(built_sql(&filter).contains("t.category_id = $2"));
    }

    /// One category and one wallet for the transfers under test.
    async fn seed_refs(conn: &mut PgConnection, owner: UserId) -> (CategoryId, crate::types::WalletId) {
        let category = Categories::new(&mut *conn)
            .create(
                owner,
                &CategoryCreateDBRequest {
                    name: "Rent".to_string(),
                    description: None,
                    kind: CategoryKind::Expense,
                },
            )
            .await
            .unwrap();
        let wallet = Wallets::new(&mut *conn)
            .create(
                owner,
                &WalletCreateDBRequest {
                    name: "Main".to_string(),
                    description: None,
                    balance: dec!(0),
                },
            )
            .await
            .unwrap();
        (category.id, wallet.id)
    }

    fn transfer_request(
        category_id: CategoryId,
        wallet_id: crate::types::WalletId,
        title: &str,
        amount: Decimal,
        day: u32,
    ) -> TransferCreateDBRequest {
        TransferCreateDBRequest {
            title: title.to_string(),
            notes: None,
            amount,
            occurred_on: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            category_id,
            wallet_id,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_joins_category_and_wallet_names(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let owner = create_test_user(&mut conn, "kate").await.id;
        let (category_id, wallet_id) = seed_refs(&mut conn, owner).await;

        let mut repo = Transfers::new(&mut conn);
        let transfer = repo
            .create(owner, &transfer_request(category_id, wallet_id, "March rent", dec!(900), 1))
            .await
            .unwrap();

        assert_eq!(transfer.title, "March rent");
        assert_eq!(transfer.amount, dec!(900));
        assert_eq!(transfer.category_name, "Rent");
        assert_eq!(transfer.wallet_name, "Main");

        let fetched = repo.get_by_id(owner, transfer.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, transfer.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_other_users_transfers_look_missing(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let owner = create_test_user(&mut conn, "liam").await.id;
        let other = create_test_user(&mut conn, "mona").await.id;
        let (category_id, wallet_id) = seed_refs(&mut conn, owner).await;

        let mut repo = Transfers::new(&mut conn);
        let transfer = repo
            .create(owner, &transfer_request(category_id, wallet_id, "Groceries", dec!(55), 3))
            .await
            .unwrap();

        assert!(repo.get_by_id(other, transfer.id).await.unwrap().is_none());
        let hijack = repo
            .update(
                other,
                transfer.id,
                &TransferUpdateDBRequest {
                    title: "Hijacked".to_string(),
                    notes: None,
                    amount: dec!(1),
                    occurred_on: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
                    category_id,
                    wallet_id,
                },
            )
            .await;
        assert!(matches!(hijack, Err(DbError::NotFound)));
        assert!(!repo.delete(other, transfer.id).await.unwrap());
        assert!(repo.get_by_id(owner, transfer.id).await.unwrap().is_some());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_windows_while_count_ignores_the_window(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let owner = create_test_user(&mut conn, "nina").await.id;
        let (category_id, wallet_id) = seed_refs(&mut conn, owner).await;

        let mut repo = Transfers::new(&mut conn);
        for day in 1..=5 {
            repo.create(
                owner,
                &transfer_request(category_id, wallet_id, &format!("day {day}"), dec!(10), day),
            )
            .await
            .unwrap();
        }

        let filter = TransferFilter {
            sort: TransferSort::DateAsc,
            limit: 2,
            offset: 2,
            ..Default::default()
        };
        let page = repo.list(owner, &filter).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].title, "day 3");
        assert_eq!(page[1].title, "day 4");

        assert_eq!(repo.count(owner, &filter).await.unwrap(), 5);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_search_and_date_bounds_run_against_rows(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let owner = create_test_user(&mut conn, "omar").await.id;
        let (category_id, wallet_id) = seed_refs(&mut conn, owner).await;

        let mut repo = Transfers::new(&mut conn);
        repo.create(owner, &transfer_request(category_id, wallet_id, "March rent", dec!(900), 1))
            .await
            .unwrap();
        repo.create(owner, &transfer_request(category_id, wallet_id, "Cinema", dec!(15), 20))
            .await
            .unwrap();

        let searched = repo
            .list(
                owner,
                &TransferFilter {
                    search: Some("rent".to_string()),
                    limit: 10,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].title, "March rent");

        let bounded = repo
            .list(
                owner,
                &TransferFilter {
                    min_date: NaiveDate::from_ymd_opt(2026, 3, 10),
                    limit: 10,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(bounded.len(), 1);
        assert_eq!(bounded[0].title, "Cinema");
    }
}
