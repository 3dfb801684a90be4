//! Category API models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{db::models::categories::Category, errors::Error, types::CategoryId};

/// Income/expense classification. Mutually exclusive and fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "category_kind", rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(row: Category) -> Self {
        CategoryResponse {
            id: row.id,
            name: row.name,
            description: row.description,
            kind: row.kind,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCreate {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
}

impl CategoryCreate {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::bad_request("category name must not be empty"));
        }
        Ok(())
    }
}

/// Full-replace update. The kind is fixed at creation and cannot change.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    #[schema(value_type = String, format = "uuid")]
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

impl CategoryUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::bad_request("category name must not be empty"));
        }
        Ok(())
    }
}

/// Query parameters for `GET /api/categories`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListQuery {
    /// Case-insensitive substring match on name/description
    pub search: Option<String>,
    /// Restrict to one category kind
    #[serde(rename = "type")]
    pub kind: Option<CategoryKind>,
    /// Sort token; unknown tokens silently fall back to the default
    pub sort_by: Option<String>,
}

/// Whitelisted category orderings. Default: name ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategorySort {
    #[default]
    NameAsc,
    NameDesc,
}

impl CategorySort {
    /// Parse a sort token. Unknown or absent tokens degrade to the default
    /// rather than erroring; the API stays permissive.
    pub fn parse(token: Option<&str>) -> Self {
        match token {
            Some("name_asc") => CategorySort::NameAsc,
            Some("name_desc") => CategorySort::NameDesc,
            _ => CategorySort::default(),
        }
    }

    /// ORDER BY clause, with an id tiebreak so orderings are stable.
    pub fn order_clause(&self) -> &'static str {
        match self {
            CategorySort::NameAsc => "name ASC, id ASC",
            CategorySort::NameDesc => "name DESC, id DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sort_token_falls_back_to_default() {
        assert_eq!(CategorySort::parse(Some("zzz")), CategorySort::parse(None));
        assert_eq!(CategorySort::parse(None), CategorySort::NameAsc);
    }

    #[test]
    fn test_known_sort_tokens() {
        assert_eq!(CategorySort::parse(Some("name_asc")), CategorySort::NameAsc);
        assert_eq!(CategorySort::parse(Some("name_desc")), CategorySort::NameDesc);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&CategoryKind::Income).unwrap(), "\"income\"");
        assert_eq!(serde_json::to_string(&CategoryKind::Expense).unwrap(), "\"expense\"");
    }

    #[test]
    fn test_create_validation() {
        let create = CategoryCreate {
            name: "   ".to_string(),
            description: None,
            kind: CategoryKind::Expense,
        };
        assert!(create.validate().is_err());
    }
}
