//! Collection statistics and pagination.
//!
//! Pure functions over a collection's items as returned by
//! [`crate::store::EntityStore::list_by_collection`]. No locking here; the
//! caller hands in a snapshot.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_PAGE, DEFAULT_PAGE_LIMIT};
use crate::model::Collectible;

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Supply summary for one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub collection_name: String,
    pub total_supply: usize,
    pub minted_count: usize,
    /// `minted_count / total_supply * 100`, unrounded.
    pub percentage_minted: f64,
    pub remaining_supply: usize,
    /// Fee of the first collectible in listing order.
    pub mint_fee: u64,
}

impl CollectionStats {
    /// Summarise `items`. `None` for an empty collection, which the API
    /// reports as "not found".
    pub fn compute(collection_name: &str, items: &[Collectible]) -> Option<Self> {
        let first = items.first()?;
        let total_supply = items.len();
        let minted_count = items.iter().filter(|c| c.is_minted).count();

        Some(Self {
            collection_name: collection_name.to_string(),
            total_supply,
            minted_count,
            percentage_minted: minted_count as f64 / total_supply as f64 * 100.0,
            remaining_supply: total_supply - minted_count,
            mint_fee: first.mint_fee,
        })
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// A 1-based page request. Both fields are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a request from raw query-string values.
    ///
    /// Parsing is lenient: one optional `+` and the leading digits are used
    /// (`"3.5"` is page 3, `"+2"` is page 2) and anything missing,
    /// non-numeric or zero falls back to the default.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_leading_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_leading_positive(limit).unwrap_or(DEFAULT_PAGE_LIMIT),
        }
    }
}

fn parse_leading_positive(raw: Option<&str>) -> Option<usize> {
    let trimmed = raw?.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: &str = match trimmed.find(|c: char| !c.is_ascii_digit()) {
        Some(end) => &trimmed[..end],
        None => trimmed,
    };
    digits.parse::<usize>().ok().filter(|n| *n > 0)
}

/// Pagination summary returned next to a page of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: usize,
    pub page: usize,
    pub pages: usize,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Slice `items` according to `request`. Pages past the end are empty.
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let total = items.len();
    let start = (request.page - 1).saturating_mul(request.limit).min(total);
    let end = start.saturating_add(request.limit).min(total);

    Page {
        items: items[start..end].to_vec(),
        pagination: Pagination {
            total,
            page: request.page,
            pages: total.div_ceil(request.limit),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EntityStore;

    #[test]
    fn fresh_seed_stats() {
        let store = EntityStore::seeded();
        let items = store.list_by_collection("Pixel Foxes");
        let stats = CollectionStats::compute("Pixel Foxes", &items).unwrap();
        assert_eq!(stats.total_supply, 5);
        assert_eq!(stats.minted_count, 0);
        assert_eq!(stats.percentage_minted, 0.0);
        assert_eq!(stats.remaining_supply, 5);
        assert_eq!(stats.mint_fee, 10_000);
    }

    #[test]
    fn stats_track_minting() {
        let store = EntityStore::seeded();
        store.set_minted("ord1:pixel-fox-4");
        let stats =
            CollectionStats::compute("Pixel Foxes", &store.list_by_collection("Pixel Foxes"))
                .unwrap();
        assert_eq!(stats.minted_count, 1);
        assert_eq!(stats.percentage_minted, 20.0);
        assert_eq!(stats.remaining_supply, 4);
        assert_eq!(
            stats.remaining_supply,
            stats.total_supply - stats.minted_count
        );
    }

    #[test]
    fn empty_collection_has_no_stats() {
        assert!(CollectionStats::compute("Unknown", &[]).is_none());
    }

    #[test]
    fn pagination_of_five_by_two() {
        let items: Vec<u32> = (1..=5).collect();
        let req = PageRequest { page: 1, limit: 2 };
        let page = paginate(&items, req);
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.pagination.pages, 3);
        assert_eq!(page.pagination.total, 5);

        let last = paginate(&items, PageRequest { page: 3, limit: 2 });
        assert_eq!(last.items, vec![5]);

        let past = paginate(&items, PageRequest { page: 9, limit: 2 });
        assert!(past.items.is_empty());
        assert_eq!(past.pagination.page, 9);
    }

    #[test]
    fn query_parsing_is_lenient() {
        assert_eq!(PageRequest::from_query(None, None), PageRequest::default());
        assert_eq!(
            PageRequest::from_query(Some("2"), Some("3")),
            PageRequest { page: 2, limit: 3 }
        );
        assert_eq!(
            PageRequest::from_query(Some("3.9"), Some("abc")),
            PageRequest { page: 3, limit: 10 }
        );
        assert_eq!(
            PageRequest::from_query(Some("0"), Some("-4")),
            PageRequest { page: 1, limit: 10 }
        );
    }

    #[test]
    fn query_accepts_one_leading_plus() {
        assert_eq!(
            PageRequest::from_query(Some("+2"), Some(" +3")),
            PageRequest { page: 2, limit: 3 }
        );
        assert_eq!(
            PageRequest::from_query(Some("++2"), Some("+")),
            PageRequest::default()
        );
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let items = [1, 2, 3];
        let page = paginate(&items, PageRequest { page: usize::MAX, limit: usize::MAX });
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.pages, 1);
    }
}
