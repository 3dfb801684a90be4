//! Wallet API models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{db::models::wallets::Wallet, errors::Error, types::WalletId};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: WalletId,
    pub name: String,
    pub description: Option<String>,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Wallet> for WalletResponse {
    fn from(row: Wallet) -> Self {
        WalletResponse {
            id: row.id,
            name: row.name,
            description: row.description,
            balance: row.balance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletCreate {
    pub name: String,
    pub description: Option<String>,
    /// Opening balance. Defaults to zero when omitted.
    pub balance: Option<Decimal>,
}

impl WalletCreate {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::bad_request("wallet name must not be empty"));
        }
        Ok(())
    }
}

/// Full-replace update: every field is written as given.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletUpdate {
    #[schema(value_type = String, format = "uuid")]
    pub id: WalletId,
    pub name: String,
    pub description: Option<String>,
    pub balance: Decimal,
}

impl WalletUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::bad_request("wallet name must not be empty"));
        }
        Ok(())
    }
}

/// Query parameters for `GET /api/wallets`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct WalletListQuery {
    /// Case-insensitive substring match on name/description
    pub search: Option<String>,
    /// Sort token; unknown tokens silently fall back to the default
    pub sort_by: Option<String>,
}

/// Whitelisted wallet orderings. Default: balance descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalletSort {
    #[default]
    BalanceDesc,
    BalanceAsc,
    NameAsc,
    NameDesc,
}

impl WalletSort {
    pub fn parse(token: Option<&str>) -> Self {
        match token {
            Some("balance_desc") => WalletSort::BalanceDesc,
            Some("balance_asc") => WalletSort::BalanceAsc,
            Some("name_asc") => WalletSort::NameAsc,
            Some("name_desc") => WalletSort::NameDesc,
            _ => WalletSort::default(),
        }
    }

    /// ORDER BY clause, with an id tiebreak so orderings are stable.
    pub fn order_clause(&self) -> &'static str {
        match self {
            WalletSort::BalanceDesc => "balance DESC, id DESC",
            WalletSort::BalanceAsc => "balance ASC, id ASC",
            WalletSort::NameAsc => "name ASC, id ASC",
            WalletSort::NameDesc => "name DESC, id DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unknown_sort_token_falls_back_to_default() {
        assert_eq!(WalletSort::parse(Some("amount_asc")), WalletSort::BalanceDesc);
        assert_eq!(WalletSort::parse(None), WalletSort::BalanceDesc);
    }

    #[test]
    fn test_known_sort_tokens() {
        assert_eq!(WalletSort::parse(Some("balance_asc")), WalletSort::BalanceAsc);
        assert_eq!(WalletSort::parse(Some("name_desc")), WalletSort::NameDesc);
    }

    #[test]
    fn test_create_balance_defaults_to_none() {
        let create: WalletCreate = serde_json::from_str(r#"{"name": "Cash"}"#).unwrap();
        assert_eq!(create.balance, None);
        assert!(create.validate().is_ok());
    }

    #[test]
    fn test_update_parses_decimal_balance() {
        let update: WalletUpdate =
            serde_json::from_str(r#"{"id": "0193b0ca-7a00-7000-8000-000000000001", "name": "Cash", "balance": "120.50"}"#)
                .unwrap();
        assert_eq!(update.balance, dec!(120.50));
    }
}
