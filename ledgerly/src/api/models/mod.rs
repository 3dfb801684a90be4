//! Request/response data structures for API communication.
//!
//! Each entity gets its own module with create/update request types, a
//! response DTO, and the list-query parameters (filters + sort token). Sort
//! tokens are closed enums with a silent fallback to the documented default,
//! so an unknown `sortBy` behaves exactly like an absent one.

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod pagination;
pub mod transfers;
pub mod wallets;

/// Normalize a free-text search filter: trim, then treat empty as no filter.
///
/// Every filter call site goes through this so whitespace-only input behaves
/// identically to an absent parameter.
pub fn normalize_search(search: Option<&str>) -> Option<&str> {
    match search {
        Some(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_search_absent() {
        assert_eq!(normalize_search(None), None);
    }

    #[test]
    fn test_normalize_search_whitespace_only_is_no_filter() {
        assert_eq!(normalize_search(Some("")), None);
        assert_eq!(normalize_search(Some("   ")), None);
        assert_eq!(normalize_search(Some("\t\n")), None);
    }

    #[test]
    fn test_normalize_search_trims() {
        assert_eq!(normalize_search(Some("  rent ")), Some("rent"));
        assert_eq!(normalize_search(Some("groceries")), Some("groceries"));
    }
}
