//! Database models for wallets.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::types::{UserId, WalletId};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Wallet {
    pub id: WalletId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WalletCreateDBRequest {
    pub name: String,
    pub description: Option<String>,
    pub balance: Decimal,
}

/// Database request for updating a wallet (full replace).
#[derive(Debug, Clone)]
pub struct WalletUpdateDBRequest {
    pub name: String,
    pub description: Option<String>,
    pub balance: Decimal,
}
