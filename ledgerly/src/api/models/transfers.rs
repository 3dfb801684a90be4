//! Transfer API models.
//!
//! A transfer is one movement of money through a wallet, classified by its
//! category as income or expense. List queries carry the richest filter set
//! in the API: text search, amount and date ranges, a kind filter and a
//! whitelisted sort token, plus pagination.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::models::{categories::CategoryKind, pagination::PageQuery},
    errors::Error,
    types::{CategoryId, TransferId, WalletId},
};

/// A transfer joined with the names of its category and wallet, as returned
/// by every read endpoint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: TransferId,
    pub title: String,
    pub notes: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[schema(value_type = String, format = "uuid")]
    pub category_id: CategoryId,
    pub category_name: String,
    #[schema(value_type = String, format = "uuid")]
    pub wallet_id: WalletId,
    pub wallet_name: String,
}

impl From<crate::db::models::transfers::TransferRow> for TransferResponse {
    fn from(row: crate::db::models::transfers::TransferRow) -> Self {
        TransferResponse {
            id: row.id,
            title: row.title,
            notes: row.notes,
            amount: row.amount,
            date: row.occurred_on,
            category_id: row.category_id,
            category_name: row.category_name,
            wallet_id: row.wallet_id,
            wallet_name: row.wallet_name,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferCreate {
    pub title: String,
    pub notes: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[schema(value_type = String, format = "uuid")]
    pub category_id: CategoryId,
    #[schema(value_type = String, format = "uuid")]
    pub wallet_id: WalletId,
}

impl TransferCreate {
    pub fn validate(&self) -> Result<(), Error> {
        validate_transfer(&self.title, self.amount)
    }
}

/// Full-replace update. Category and wallet may both be repointed.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferUpdate {
    #[schema(value_type = String, format = "uuid")]
    pub id: TransferId,
    pub title: String,
    pub notes: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[schema(value_type = String, format = "uuid")]
    pub category_id: CategoryId,
    #[schema(value_type = String, format = "uuid")]
    pub wallet_id: WalletId,
}

impl TransferUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        validate_transfer(&self.title, self.amount)
    }
}

fn validate_transfer(title: &str, amount: Decimal) -> Result<(), Error> {
    if title.trim().is_empty() {
        return Err(Error::bad_request("transfer title must not be empty"));
    }
    if amount <= Decimal::ZERO {
        return Err(Error::bad_request("transfer amount must be positive"));
    }
    Ok(())
}

/// Query parameters for `GET /api/transfers`.
///
/// Everything arrives as a string in the query component, so the numeric and
/// date fields parse via their `Display`/`FromStr` forms. Pagination fields
/// live here directly rather than in a nested struct; serde cannot flatten
/// into urlencoded form data.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TransferListQuery {
    /// Case-insensitive substring match on title/notes
    pub search: Option<String>,
    /// Inclusive lower bound on amount
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub min_amount: Option<Decimal>,
    /// Inclusive upper bound on amount
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub max_amount: Option<Decimal>,
    /// Inclusive lower bound on date (YYYY-MM-DD)
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub min_date: Option<NaiveDate>,
    /// Inclusive upper bound on date (YYYY-MM-DD)
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub max_date: Option<NaiveDate>,
    /// Restrict to transfers whose category has this kind
    #[serde(rename = "type")]
    pub kind: Option<CategoryKind>,
    /// Sort token; unknown tokens silently fall back to the default
    pub sort_by: Option<String>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page_size: Option<i64>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page_number: Option<i64>,
}

impl TransferListQuery {
    pub fn page(&self) -> PageQuery {
        PageQuery {
            page_size: self.page_size,
            page_number: self.page_number,
        }
    }
}

/// Whitelisted transfer orderings. Default: date descending (newest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferSort {
    TitleAsc,
    TitleDesc,
    AmountAsc,
    AmountDesc,
    DateAsc,
    #[default]
    DateDesc,
}

impl TransferSort {
    pub fn parse(token: Option<&str>) -> Self {
        match token {
            Some("title_asc") => TransferSort::TitleAsc,
            Some("title_desc") => TransferSort::TitleDesc,
            Some("amount_asc") => TransferSort::AmountAsc,
            Some("amount_desc") => TransferSort::AmountDesc,
            Some("date_asc") => TransferSort::DateAsc,
            Some("date_desc") => TransferSort::DateDesc,
            _ => TransferSort::default(),
        }
    }

    /// ORDER BY clause over the aliased transfers table, with an id tiebreak
    /// so pagination never shuffles rows between pages.
    pub fn order_clause(&self) -> &'static str {
        match self {
            TransferSort::TitleAsc => "t.title ASC, t.id ASC",
            TransferSort::TitleDesc => "t.title DESC, t.id DESC",
            TransferSort::AmountAsc => "t.amount ASC, t.id ASC",
            TransferSort::AmountDesc => "t.amount DESC, t.id DESC",
            TransferSort::DateAsc => "t.occurred_on ASC, t.id ASC",
            TransferSort::DateDesc => "t.occurred_on DESC, t.id DESC",
        }
    }
}
