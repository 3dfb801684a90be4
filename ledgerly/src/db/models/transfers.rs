//! Database models for transfers.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    api::models::categories::CategoryKind,
    types::{CategoryId, TransferId, WalletId},
};

#[derive(Debug, Clone)]
pub struct TransferCreateDBRequest {
    pub title: String,
    pub notes: Option<String>,
    pub amount: Decimal,
    pub occurred_on: NaiveDate,
    pub category_id: CategoryId,
    pub wallet_id: WalletId,
}

/// Database request for updating a transfer (full replace).
#[derive(Debug, Clone)]
pub struct TransferUpdateDBRequest {
    pub title: String,
    pub notes: Option<String>,
    pub amount: Decimal,
    pub occurred_on: NaiveDate,
    pub category_id: CategoryId,
    pub wallet_id: WalletId,
}

/// A transfer row joined with its category's kind and name and its wallet's
/// name. This is the shape the dashboard aggregations consume.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransferRow {
    pub id: TransferId,
    pub title: String,
    pub notes: Option<String>,
    pub amount: Decimal,
    pub occurred_on: NaiveDate,
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_kind: CategoryKind,
    pub wallet_id: WalletId,
    pub wallet_name: String,
}
